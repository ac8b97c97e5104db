//! Usage text for `-h` / `--help`

use super::config::{CHECK_STEP_FACTOR, SAVE_STEP_FACTOR};
use crate::device::{DeviceEnumerator, DeviceError};

/// Upper bound on devices listed in the help text
pub const MAX_LISTED_DEVICES: usize = 16;

const FILES_TEXT: &str = "\
Files used by owl:
    - worktodo.txt : contains exponents to test \"Test=N\", one per line
    - results.txt : contains LL results
    - cN.ll : the most recent checkpoint for exponent <N>; will resume from here
    - tN.ll : the previous checkpoint, to be used if cN.ll is lost or corrupted
    - bN.ll : a temporary checkpoint that is renamed to cN.ll once successfully written
    - sN.iteration.residue.ll : a persistent checkpoint at the given iteration
";

const WORKTODO_TEXT: &str = "\
The lines in worktodo.txt must be of one of these forms:
Test=70100200
Test=3181F68030F6BF3DCD32B77337D5EF6B,70100200,75,1
DoubleCheck=3181F68030F6BF3DCD32B77337D5EF6B,70100200,75,1
Test=0,70100200,0,0
";

/// Option reference, with defaults derived from `log_step`
pub fn options_text(log_step: u64) -> String {
    format!(
        "Command line options:\n\
         -logstep  <N>     : to log every <N> iterations (default {log_step})\n\
         -savestep <N>     : to persist checkpoint every <N> iterations (default {SAVE_STEP_FACTOR}*logstep == {save})\n\
         -checkstep <N>    : do Jacobi-symbol check every <N> iterations (default {CHECK_STEP_FACTOR}*logstep == {check})\n\
         -uid user/machine : set UID: string to be prepended to the result line\n\
         -supersafe        : use iterative double-check for reliable results on unreliable hardware\n\
         -cl \"<OpenCL compiler options>\", e.g. -cl \"-save-temps=tmp/ -O2\"\n\
         -selftest         : perform self tests from 'selftest.txt'\n\
         \x20                   Self-test mode does not load/save checkpoints, worktodo.txt or results.txt.\n\
         -time kernels     : to benchmark kernels (logstep must be > 1)\n\
         -legacy           : use legacy kernels\n\
         \n\
         -device <N>       : select specific device among:\n",
        save = SAVE_STEP_FACTOR * log_step,
        check = CHECK_STEP_FACTOR * log_step,
    )
}

/// `    <index> : <description>` lines for up to [`MAX_LISTED_DEVICES`] devices
pub fn device_lines<D>(devices: &D) -> Result<Vec<String>, DeviceError>
where
    D: DeviceEnumerator + ?Sized,
{
    Ok(devices
        .enumerate(MAX_LISTED_DEVICES)?
        .iter()
        .enumerate()
        .map(|(i, handle)| format!("    {i} : {}", devices.describe(handle)))
        .collect())
}

/// Full help text, one entry per output line
///
/// Sections, in order: options, device list, files, work-queue formats. A
/// failed enumeration is shown in place of the device list. Blank lines are
/// dropped so each entry can go out as its own log event.
pub fn render_lines(log_step: u64, devices: &Result<Vec<String>, DeviceError>) -> Vec<String> {
    let mut lines: Vec<String> = options_text(log_step).lines().map(str::to_string).collect();
    match devices {
        Ok(listed) => lines.extend(listed.iter().cloned()),
        Err(e) => lines.push(format!("    (unable to list devices: {e})")),
    }
    lines.extend(FILES_TEXT.lines().map(str::to_string));
    lines.extend(WORKTODO_TEXT.lines().map(str::to_string));
    lines.retain(|line| !line.trim().is_empty());
    lines
}
