// Interactive prompts.
// Asks for free-form answers or a choice from a numbered list.

use std::io::{self, BufRead, Write};

use crate::error::{IssueError, Result};

/// Reads answers from one stream and writes questions to another.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

/// Prompter used by the commands, boxed so answers can come from anywhere.
pub type Console = Prompter<Box<dyn BufRead>, Box<dyn Write>>;

impl Console {
    /// Prompt on the terminal.
    pub fn stdio() -> Self {
        Self::new(Box::new(io::stdin().lock()), Box::new(io::stdout()))
    }
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Ask a question, returning the trimmed answer or `default` when it is empty.
    pub fn ask(&mut self, question: &str, default: Option<&str>) -> Result<String> {
        match default {
            Some(default) => write!(self.output, " {} [{}]:\n > ", question, default)?,
            None => write!(self.output, " {}\n > ", question)?,
        }
        self.output.flush()?;

        let answer = self.read_answer()?;
        Ok(match (answer.is_empty(), default) {
            (true, Some(default)) => default.to_string(),
            _ => answer,
        })
    }

    /// Ask the user to pick one of `choices`, returning its index.
    ///
    /// The answer may be the number shown next to a choice or the choice text itself.
    /// Invalid answers are rejected and the question is asked again.
    pub fn choose<S: AsRef<str>>(&mut self, question: &str, choices: &[S]) -> Result<usize> {
        if choices.is_empty() {
            return Err(IssueError::CommandFailed(format!(
                "Nothing to choose from: {}",
                question
            )));
        }

        loop {
            writeln!(self.output, " {}", question)?;
            for (index, choice) in choices.iter().enumerate() {
                writeln!(self.output, "  [{}] {}", index, choice.as_ref())?;
            }
            write!(self.output, " > ")?;
            self.output.flush()?;

            let answer = self.read_answer()?;
            let picked = answer
                .parse::<usize>()
                .ok()
                .filter(|index| *index < choices.len())
                .or_else(|| choices.iter().position(|choice| choice.as_ref() == answer));

            match picked {
                Some(index) => return Ok(index),
                None => writeln!(self.output, " Value \"{}\" is invalid", answer)?,
            }
        }
    }

    fn read_answer(&mut self) -> Result<String> {
        let mut buffer = String::new();
        if self.input.read_line(&mut buffer)? == 0 {
            return Err(IssueError::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "no answer on standard input",
            )));
        }
        Ok(buffer.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prompter(input: &str) -> Prompter<&[u8], Vec<u8>> {
        Prompter::new(input.as_bytes(), Vec::new())
    }

    #[test]
    fn test_ask() {
        let mut prompt = prompter("2924818\n");
        let answer = prompt.ask("What issue are you working on?", None).unwrap();
        assert_eq!(answer, "2924818");

        let output = String::from_utf8(prompt.output).unwrap();
        assert!(output.contains("What issue are you working on?"));
    }

    #[test]
    fn test_ask_default() {
        let mut prompt = prompter("\n");
        let answer = prompt
            .ask("What project are you working on?", Some("drupal"))
            .unwrap();
        assert_eq!(answer, "drupal");
    }

    #[test]
    fn test_choose_by_index_and_name() {
        let choices = ["a.patch", "b.patch", "Do not create interdiff"];

        assert_eq!(prompter("1\n").choose("Which?", &choices).unwrap(), 1);
        assert_eq!(prompter("a.patch\n").choose("Which?", &choices).unwrap(), 0);
    }

    #[test]
    fn test_choose_retries_invalid_answer() {
        let choices = ["a.patch", "b.patch"];
        let mut prompt = prompter("7\nnope\n0\n");

        assert_eq!(prompt.choose("Which?", &choices).unwrap(), 0);
        let output = String::from_utf8(prompt.output).unwrap();
        assert!(output.contains("Value \"7\" is invalid"));
        assert!(output.contains("Value \"nope\" is invalid"));
    }

    #[test]
    fn test_eof_is_an_error() {
        assert!(prompter("").ask("Anything?", None).is_err());
        assert!(prompter("").choose("Which?", &["a"]).is_err());
    }

    #[test]
    fn test_choose_nothing() {
        let choices: [&str; 0] = [];
        assert!(prompter("0\n").choose("Which?", &choices).is_err());
    }
}
