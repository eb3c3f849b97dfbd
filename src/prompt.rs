//! Interactive conflict resolution over a line-oriented console.
//!
//! Each conflict is printed with its menu, then the operator is asked for a
//! choice until one of `1`-`4` arrives. Invalid answers are reported and
//! re-prompted; only end of input ends the loop without a choice.
use std::io::{self, BufRead, Stdout, StdinLock, Write};

use log::debug;

use crate::reconcile::{ConflictCase, Disposition, Resolver};
use crate::report::{render_conflict, render_conflicts_header, render_invalid_choice, render_prompt};

pub struct ConsoleResolver<R, W> {
    input: R,
    output: W,
}

impl ConsoleResolver<StdinLock<'static>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> ConsoleResolver<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_inner(self) -> (R, W) {
        (self.input, self.output)
    }

    fn read_choice(&mut self, position: usize) -> io::Result<Disposition> {
        let mut line = String::new();
        loop {
            write!(self.output, "{}", render_prompt(position))?;
            self.output.flush()?;
            line.clear();
            if self.input.read_line(&mut line)? == 0 {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!("input closed before a choice was made for conflict {position}"),
                ));
            }
            match line.parse::<Disposition>() {
                Ok(d) => return Ok(d),
                Err(e) => {
                    debug!("conflict {}: {}", position, e);
                    write!(self.output, "{}", render_invalid_choice())?;
                }
            }
        }
    }
}

impl<R: BufRead, W: Write> Resolver for ConsoleResolver<R, W> {
    fn begin(&mut self, total: usize) -> io::Result<()> {
        write!(self.output, "{}", render_conflicts_header(total))
    }

    fn resolve(
        &mut self,
        case: &ConflictCase,
        position: usize,
        _total: usize,
    ) -> io::Result<Disposition> {
        write!(self.output, "{}", render_conflict(case, position))?;
        self.read_choice(position)
    }
}
