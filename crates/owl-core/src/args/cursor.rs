//! Token cursor over the raw argument list

use super::error::ArgsError;

/// Largest accepted interval value
pub const MAX_STEP: u64 = u32::MAX as u64;

/// Forward-only cursor over command tokens
///
/// Flags are pulled with [`TokenCursor::next_flag`]; value-taking flags pull
/// their value with [`TokenCursor::value_for`], which turns a missing token
/// into the flag's diagnostic.
#[derive(Debug)]
pub struct TokenCursor<I> {
    tokens: I,
}

impl<I> TokenCursor<I>
where
    I: Iterator<Item = String>,
{
    pub fn new<T>(tokens: T) -> Self
    where
        T: IntoIterator<IntoIter = I>,
    {
        Self {
            tokens: tokens.into_iter(),
        }
    }

    /// Next token in flag position, or `None` once all tokens are consumed
    pub fn next_flag(&mut self) -> Option<String> {
        self.tokens.next()
    }

    /// Next token as the value of `flag`
    pub fn value_for(
        &mut self,
        flag: &'static str,
        expected: &'static str,
    ) -> Result<String, ArgsError> {
        self.tokens
            .next()
            .ok_or(ArgsError::MissingValue { flag, expected })
    }

    /// Next token as a positive iteration count for `flag`
    pub fn count_for(&mut self, flag: &'static str) -> Result<u64, ArgsError> {
        let value = self.value_for(flag, "<N> argument")?;
        match value.parse::<i64>() {
            Ok(n) if n > 0 && (n as u64) <= MAX_STEP => Ok(n as u64),
            _ => Err(ArgsError::InvalidCount { flag, value }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cursor(tokens: &[&str]) -> TokenCursor<std::vec::IntoIter<String>> {
        TokenCursor::new(tokens.iter().map(|t| t.to_string()).collect::<Vec<_>>())
    }

    #[test]
    fn test_value_for_consumes_one_token() {
        let mut c = cursor(&["-uid", "alice/box", "-legacy"]);
        assert_eq!(c.next_flag().as_deref(), Some("-uid"));
        assert_eq!(
            c.value_for("-uid", "userName/computerName").unwrap(),
            "alice/box"
        );
        assert_eq!(c.next_flag().as_deref(), Some("-legacy"));
        assert!(c.next_flag().is_none());
    }

    #[test]
    fn test_value_for_missing() {
        let mut c = cursor(&["-cl"]);
        c.next_flag();
        let err = c
            .value_for("-cl", "options string to pass to CL compiler")
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "-cl expects options string to pass to CL compiler"
        );
    }

    #[test]
    fn test_count_for_accepts_positive() {
        let mut c = cursor(&["5000"]);
        assert_eq!(c.count_for("-logstep").unwrap(), 5000);
    }

    #[test]
    fn test_count_for_rejects_zero_negative_and_garbage() {
        for bad in ["0", "-5", "12abc", "abc", "", "4294967296"] {
            let mut c = cursor(&[bad]);
            let err = c.count_for("-savestep").unwrap_err();
            assert_eq!(
                err,
                ArgsError::InvalidCount {
                    flag: "-savestep",
                    value: bad.to_string()
                }
            );
        }
    }

    #[test]
    fn test_count_for_missing_value() {
        let mut c = cursor(&[]);
        assert_eq!(
            c.count_for("-checkstep").unwrap_err().to_string(),
            "-checkstep expects <N> argument"
        );
    }
}
