//! Combinator streams over the mouth.
//!
//! There are two views of the mouth's input: [RawStream] returns tokens
//! without expansion (used when reading `\def` texts and macro arguments)
//! and [ExpandedStream] expands as it reads (used by the number and
//! dimension parsers, where digits may come from macros).

use super::Mouth;
use crate::combinator::Journal;
use crate::combinator::Stream;
use crate::env::Environment;
use crate::source::Position;
use crate::token::Token;

/// Access to the environment from a combinator stream.
///
/// Parsers that resolve internal quantities (count registers in a number,
/// for example) require this alongside [Stream].
pub trait HasEnvironment {
    fn env(&self) -> &Environment;
}

/// A [Stream] over the mouth that does not perform expansion.
pub struct RawStream<'a> {
    mouth: &'a mut Mouth,
    journal: Journal,
    state: (),
}

impl<'a> RawStream<'a> {
    pub fn new(mouth: &'a mut Mouth) -> RawStream<'a> {
        RawStream {
            mouth,
            journal: Journal::default(),
            state: (),
        }
    }
}

impl<'a> Stream for RawStream<'a> {
    type State = ();

    fn next(&mut self) -> crate::Result<Option<Token>> {
        let token = self.mouth.next_raw()?;
        if let Some(token) = &token {
            self.journal.observe(token);
        }
        Ok(token)
    }

    fn push_back(&mut self, token: Token) {
        self.journal.observe_push_back();
        self.mouth.push_front(token);
    }

    fn position(&self) -> Position {
        self.mouth.position()
    }

    fn state(&self) -> &() {
        &self.state
    }

    fn state_mut(&mut self) -> &mut () {
        &mut self.state
    }

    fn begin_record(&mut self) {
        self.journal.begin();
    }

    fn commit_record(&mut self) {
        self.journal.commit();
    }

    fn abort_record(&mut self) {
        for token in self.journal.abort().into_iter().rev() {
            self.mouth.push_front(token);
        }
    }
}

impl<'a> HasEnvironment for RawStream<'a> {
    fn env(&self) -> &Environment {
        self.mouth.env()
    }
}

/// A [Stream] over the mouth that expands as it reads.
pub struct ExpandedStream<'a> {
    mouth: &'a mut Mouth,
    journal: Journal,
    state: (),
}

impl<'a> ExpandedStream<'a> {
    pub fn new(mouth: &'a mut Mouth) -> ExpandedStream<'a> {
        ExpandedStream {
            mouth,
            journal: Journal::default(),
            state: (),
        }
    }
}

impl<'a> Stream for ExpandedStream<'a> {
    type State = ();

    fn next(&mut self) -> crate::Result<Option<Token>> {
        let token = self.mouth.next_expanded()?;
        if let Some(token) = &token {
            self.journal.observe(token);
        }
        Ok(token)
    }

    fn push_back(&mut self, token: Token) {
        self.journal.observe_push_back();
        self.mouth.push_front(token);
    }

    fn position(&self) -> Position {
        self.mouth.position()
    }

    fn state(&self) -> &() {
        &self.state
    }

    fn state_mut(&mut self) -> &mut () {
        &mut self.state
    }

    fn begin_record(&mut self) {
        self.journal.begin();
    }

    fn commit_record(&mut self) {
        self.journal.commit();
    }

    fn abort_record(&mut self) {
        for token in self.journal.abort().into_iter().rev() {
            self.mouth.push_front(token);
        }
    }
}

impl<'a> HasEnvironment for ExpandedStream<'a> {
    fn env(&self) -> &Environment {
        self.mouth.env()
    }
}
