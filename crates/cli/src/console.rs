//! Terminal resolver: prompts on one stream, reads answers from another.

use std::io::{BufRead, Write};

use canonry_resolve::model::{Candidate, Selection};
use canonry_resolve::{CanonError, Resolver};

pub struct ConsoleResolver<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> ConsoleResolver<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn say(&mut self, text: &str) -> Result<(), CanonError> {
        writeln!(self.output, "{text}").map_err(|e| CanonError::Resolver(e.to_string()))
    }

    fn ask(&mut self, prompt: &str) -> Result<String, CanonError> {
        write!(self.output, "{prompt}")
            .and_then(|()| self.output.flush())
            .map_err(|e| CanonError::Resolver(e.to_string()))?;

        let mut line = String::new();
        let n = self
            .input
            .read_line(&mut line)
            .map_err(|e| CanonError::Resolver(e.to_string()))?;
        if n == 0 {
            return Err(CanonError::Resolver("prompt input closed".into()));
        }
        Ok(line.trim().to_string())
    }

    fn ask_yes_no(&mut self, prompt: &str) -> Result<bool, CanonError> {
        loop {
            match self.ask(prompt)?.to_uppercase().as_str() {
                "Y" => return Ok(true),
                "N" => return Ok(false),
                _ => self.say("Please enter Y or N")?,
            }
        }
    }
}

impl<R: BufRead, W: Write> Resolver for ConsoleResolver<R, W> {
    fn confirm(&mut self, input: &str, candidate: &Candidate) -> Result<bool, CanonError> {
        self.say(&format!("\nOriginal product name: {input}"))?;
        self.say(&format!("Suggested change to: {}", candidate.entry))?;
        self.say(&format!("Similarity: {:.1}%", candidate.score * 100.0))?;
        self.ask_yes_no("Accept this change? (Y/N): ")
    }

    fn select(&mut self, input: &str, candidates: &[Candidate]) -> Result<Selection, CanonError> {
        self.say(&format!("\nOriginal product name: '{input}'"))?;
        self.say("Please select the correct product name from the following options:")?;
        self.say("0. Keep original value (no change)")?;
        for (i, c) in candidates.iter().enumerate() {
            self.say(&format!("{}. {} (Similarity: {:.1}%)", i + 1, c.entry, c.score * 100.0))?;
        }

        let n = candidates.len();
        loop {
            let answer = self.ask(&format!("\nPlease select the correct product number (0-{n}): "))?;
            match answer.parse::<usize>() {
                Ok(0) => {
                    self.say(&format!("Keeping original value: {input}"))?;
                    return Ok(Selection::Keep);
                }
                Ok(choice) if choice <= n => {
                    self.say(&format!("Selected: {}", candidates[choice - 1].entry))?;
                    return Ok(Selection::Pick(choice - 1));
                }
                _ => self.say(&format!("Please enter a number between 0 and {n}"))?,
            }
        }
    }

    fn admit(&mut self, text: &str) -> Result<bool, CanonError> {
        let admitted = self.ask_yes_no(&format!("\nAdd \"{text}\" to product list? (Y/N): "))?;
        if admitted {
            self.say(&format!("Added \"{text}\" to product list"))?;
        }
        Ok(admitted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use canonry_resolve::CanonicalEntry;
    use std::io::Cursor;

    fn candidate(text: &str, score: f64) -> Candidate {
        Candidate {
            entry: CanonicalEntry::new(text).unwrap(),
            score,
            position: 0,
        }
    }

    fn console(answers: &str) -> ConsoleResolver<Cursor<Vec<u8>>, Vec<u8>> {
        ConsoleResolver::new(Cursor::new(answers.as_bytes().to_vec()), Vec::new())
    }

    fn transcript(c: &ConsoleResolver<Cursor<Vec<u8>>, Vec<u8>>) -> String {
        String::from_utf8(c.output.clone()).unwrap()
    }

    #[test]
    fn confirm_reprompts_until_yes_or_no() {
        let mut c = console("maybe\ny\n");
        assert!(c.confirm("原味牛角飽", &candidate("原味牛角包", 0.8)).unwrap());
        let out = transcript(&c);
        assert!(out.contains("Similarity: 80.0%"));
        assert!(out.contains("Please enter Y or N"));
    }

    #[test]
    fn select_maps_numbers_to_picks() {
        let list = [candidate("A", 0.5), candidate("B", 0.4)];
        let mut c = console("3\nabc\n2\n");
        assert_eq!(c.select("x", &list).unwrap(), Selection::Pick(1));
        assert!(transcript(&c).contains("Please enter a number between 0 and 2"));

        let mut c = console("0\n");
        assert_eq!(c.select("x", &list).unwrap(), Selection::Keep);
    }

    #[test]
    fn closed_input_is_an_error() {
        let mut c = console("");
        let err = c.admit("新產品").unwrap_err();
        assert!(matches!(err, CanonError::Resolver(_)));
    }

    #[test]
    fn admit_reads_answer() {
        let mut c = console("N\n");
        assert!(!c.admit("新產品").unwrap());
        let mut c = console("Y\n");
        assert!(c.admit("新產品").unwrap());
        assert!(transcript(&c).contains("Added \"新產品\""));
    }
}
