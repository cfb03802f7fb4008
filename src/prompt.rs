//! Confirmation between preview and commit.

use std::io::{self, BufRead, Write};

use tracing::debug;

/// Asks whether a previewed batch of `count` renames should go ahead
pub trait Confirm {
    fn confirm(&mut self, count: usize) -> bool;
}

/// Always proceeds (`--yes`)
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoConfirm;

impl Confirm for AutoConfirm {
    fn confirm(&mut self, _count: usize) -> bool {
        true
    }
}

/// Reads the answer from a line of input. An empty line or `y`/`yes`
/// proceeds; anything else, end of input included, cancels.
pub struct LineConfirm<R, W> {
    input: R,
    output: W,
}

impl LineConfirm<io::StdinLock<'static>, io::Stderr> {
    pub fn stdin() -> Self {
        Self::new(io::stdin().lock(), io::stderr())
    }
}

impl<R: BufRead, W: Write> LineConfirm<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> Confirm for LineConfirm<R, W> {
    fn confirm(&mut self, count: usize) -> bool {
        let _ = write!(self.output, "Rename {} entries? [Y/n] ", count);
        let _ = self.output.flush();

        let mut answer = String::new();
        match self.input.read_line(&mut answer) {
            Ok(0) | Err(_) => false,
            Ok(_) => {
                let answer = answer.trim().to_lowercase();
                debug!(answer = %answer, "Confirmation answer");
                matches!(answer.as_str(), "" | "y" | "yes")
            }
        }
    }
}
