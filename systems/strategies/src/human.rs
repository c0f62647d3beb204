use std::io::{self, BufRead, Read, Stderr, Write};

use tracing::warn;
use vector_race_core::{Acceleration, DecisionContext, Direction, DirectionSet, Strategy};

/// Interactive player that reads decisions line by line.
///
/// Invalid input re-prompts. When the input ends, the player stops steering:
/// it declines to move and holds its speed.
#[derive(Debug)]
pub struct Human<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Human<R, W> {
    /// Creates a human player reading from `input` and prompting on `output`.
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn read_direction(&mut self, allowed: &DirectionSet) -> io::Result<Option<Direction>> {
        loop {
            writeln!(self.output, "Choose a direction from: {allowed}")?;
            self.output.flush()?;
            let Some(line) = self.next_line()? else {
                return Ok(None);
            };
            match line.parse::<Direction>() {
                Ok(direction) if allowed.contains(direction) => return Ok(Some(direction)),
                _ => writeln!(self.output, "Invalid direction. Try again.")?,
            }
        }
    }

    fn read_acceleration(&mut self) -> io::Result<i8> {
        loop {
            writeln!(
                self.output,
                "Enter -1 to brake, 0 to hold speed, +1 to accelerate"
            )?;
            self.output.flush()?;
            let Some(line) = self.next_line()? else {
                return Ok(Acceleration::Hold.delta());
            };
            match line.trim().parse::<i8>().map(Acceleration::try_from) {
                Ok(Ok(acceleration)) => return Ok(acceleration.delta()),
                _ => writeln!(self.output, "Invalid input. Try again.")?,
            }
        }
    }

    fn next_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }
}

impl Human<SharedStdin, Stderr> {
    /// Creates a human player bound to the process terminal.
    ///
    /// Prompts go to stderr so stdout stays free for the race output. Any
    /// number of terminal players may coexist; they take turns on stdin.
    #[must_use]
    pub fn stdio() -> Self {
        Self::new(SharedStdin::default(), io::stderr())
    }
}

/// Line-at-a-time reader over the process stdin.
///
/// The global stdin lock is held only while a single line is read, and no
/// bytes past that line are buffered here, so several readers can share the
/// terminal without stealing each other's input.
#[derive(Debug, Default)]
pub struct SharedStdin {
    line: String,
    consumed: usize,
}

impl Read for SharedStdin {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let available = self.fill_buf()?;
        let count = available.len().min(buf.len());
        buf[..count].copy_from_slice(&available[..count]);
        self.consume(count);
        Ok(count)
    }
}

impl BufRead for SharedStdin {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        if self.consumed >= self.line.len() {
            self.line.clear();
            self.consumed = 0;
            let _ = io::stdin().read_line(&mut self.line)?;
        }
        Ok(&self.line.as_bytes()[self.consumed..])
    }

    fn consume(&mut self, amount: usize) {
        self.consumed = (self.consumed + amount).min(self.line.len());
    }
}

impl<R: BufRead, W: Write> Strategy for Human<R, W> {
    fn choose_direction(
        &mut self,
        allowed: &DirectionSet,
        _context: &DecisionContext<'_>,
    ) -> Option<Direction> {
        if allowed.is_empty() {
            return None;
        }
        self.read_direction(allowed).unwrap_or_else(|error| {
            warn!(%error, "could not read direction; staying put");
            None
        })
    }

    fn choose_acceleration(&mut self, _context: &DecisionContext<'_>) -> i8 {
        self.read_acceleration().unwrap_or_else(|error| {
            warn!(%error, "could not read acceleration; holding speed");
            Acceleration::Hold.delta()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;
    use vector_race_core::Position;

    fn allowed() -> DirectionSet {
        [Direction::East, Direction::SouthEast].into_iter().collect()
    }

    #[test]
    fn reprompts_until_an_allowed_direction_is_entered() {
        let track = testing::track("S..");
        let context = testing::context(&track, Position::new(0, 0), 2, &[]);
        let mut output = Vec::new();
        let mut human = Human::new("north\nW\nse\n".as_bytes(), &mut output);

        assert_eq!(
            human.choose_direction(&allowed(), &context),
            Some(Direction::SouthEast)
        );
        drop(human);
        let transcript = String::from_utf8(output).expect("utf-8 prompts");
        assert_eq!(transcript.matches("Invalid direction").count(), 2);
        assert!(transcript.contains("Choose a direction from: E, SE"));
    }

    #[test]
    fn rejects_out_of_range_acceleration() {
        let track = testing::track("S..");
        let context = testing::context(&track, Position::new(0, 0), 0, &[]);
        let mut human = Human::new("2\nfast\n+1\n".as_bytes(), io::sink());

        assert_eq!(human.choose_acceleration(&context), 1);
    }

    #[test]
    fn end_of_input_declines_and_holds() {
        let track = testing::track("S..");
        let context = testing::context(&track, Position::new(0, 0), 1, &[]);
        let mut human = Human::new(io::empty(), io::sink());

        assert_eq!(human.choose_direction(&allowed(), &context), None);
        assert_eq!(human.choose_acceleration(&context), 0);
    }
}
