//! Yes/no approval before risky release transitions
//!
//! Unpublishing a public release hides it from everyone, so the reconciler
//! asks an [`ApprovalOracle`] first. The console oracle reads an answer from
//! stdin and treats anything but `y`/`yes` as "no".

use std::cell::RefCell;
use std::io::{self, BufRead, Write};
use tracing::warn;

/// Yes/no decision source
pub trait ApprovalOracle {
  /// Ask `prompt`; `true` means go ahead
  fn confirm(&self, prompt: &str) -> bool;
}

/// Approves everything (`--yes`)
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoApprove;

impl ApprovalOracle for AutoApprove {
  fn confirm(&self, prompt: &str) -> bool {
    println!("{} [y/N] y (--yes)", prompt);
    true
  }
}

/// Interactive prompt on a reader/writer pair
pub struct ConsoleOracle<R, W> {
  input: RefCell<R>,
  output: RefCell<W>,
}

impl ConsoleOracle<io::StdinLock<'static>, io::Stdout> {
  /// Prompt on stdout, answer from stdin
  pub fn stdio() -> Self {
    Self::new(io::stdin().lock(), io::stdout())
  }
}

impl<R: BufRead, W: Write> ConsoleOracle<R, W> {
  pub fn new(input: R, output: W) -> Self {
    Self {
      input: RefCell::new(input),
      output: RefCell::new(output),
    }
  }

  /// Consume the oracle and hand back the writer (for inspecting prompts)
  pub fn into_output(self) -> W {
    self.output.into_inner()
  }
}

impl<R: BufRead, W: Write> ApprovalOracle for ConsoleOracle<R, W> {
  fn confirm(&self, prompt: &str) -> bool {
    {
      let mut output = self.output.borrow_mut();
      if write!(output, "{} [y/N] ", prompt).and_then(|_| output.flush()).is_err() {
        warn!("could not write approval prompt; treating as declined");
        return false;
      }
    }

    let mut answer = String::new();
    match self.input.borrow_mut().read_line(&mut answer) {
      Ok(_) => is_yes(&answer),
      Err(e) => {
        warn!(error = %e, "could not read approval answer; treating as declined");
        false
      }
    }
  }
}

/// `y` or `yes`, any case, surrounding whitespace ignored
pub fn is_yes(answer: &str) -> bool {
  let answer = answer.trim().to_lowercase();
  answer == "y" || answer == "yes"
}
