//! Deterministic parser combinators over token streams.
//!
//! A parser is any function `Fn(&mut S) -> Reply<T>` over a stream type
//! implementing [Stream]. The [Reply] records whether the parser consumed
//! input, which makes choice deterministic: [or] only tries its second
//! alternative when the first failed *without* consuming anything. A parser
//! that needs unlimited lookahead opts in with [attempt], which converts a
//! consumed failure into an empty one by restoring the consumed tokens.
//!
//! Streams are mutable state rather than persistent values; restoration is
//! implemented with pushback. Parsers built from the primitives here
//! maintain the invariant that an empty failure leaves the stream exactly as
//! it was found.
//!
//! ```
//! # use texmouth::combinator::*;
//! # use texmouth::token::{Token, Value, CatCode};
//! # use texmouth::source::Position;
//! let digit = satisfy("a digit", |t| match t.value() {
//!     Value::Character(c @ '0'..='9', CatCode::Other) => Some(*c),
//!     _ => None,
//! });
//! let digits = many1(digit);
//! let mut stream = VecStream::new(vec![
//!     Token::new_other('4', Position::default()),
//!     Token::new_other('2', Position::default()),
//!     Token::new_letter('x', Position::default()),
//! ]);
//! assert_eq!(digits.parse(&mut stream).result.unwrap(), vec!['4', '2']);
//! ```

use crate::error::Error;
use crate::error::UserError;
use crate::source::Position;
use crate::token::Token;
use std::borrow::Cow;

/// The result of running a parser: whether any input was consumed, and
/// either a value or an error.
#[derive(Debug)]
pub struct Reply<T> {
    pub consumed: bool,
    pub result: std::result::Result<T, Box<Error>>,
}

impl<T> Reply<T> {
    pub fn ok(consumed: bool, value: T) -> Reply<T> {
        Reply {
            consumed,
            result: Ok(value),
        }
    }

    pub fn err(consumed: bool, error: Box<Error>) -> Reply<T> {
        Reply {
            consumed,
            result: Err(error),
        }
    }

    /// True if choice may try another alternative: the parser failed with a
    /// user error and consumed nothing. Fatal (I/O) errors always propagate.
    fn recoverable(&self) -> bool {
        match &self.result {
            Ok(_) => false,
            Err(error) => !self.consumed && error.user_error().is_some(),
        }
    }

    fn cast<U>(self) -> Reply<U> {
        Reply {
            consumed: self.consumed,
            result: Err(self.result.err().unwrap()),
        }
    }
}

/// A stream of tokens that parsers read from.
///
/// The stream carries a user-defined state that combinators can read and
/// update, and a recording journal used by [attempt], [look_ahead] and [not]
/// to restore consumed tokens.
pub trait Stream {
    type State;

    /// The next token, or `None` at end of input. May perform arbitrary
    /// work (lexing, expansion) to produce the token.
    fn next(&mut self) -> crate::Result<Option<Token>>;

    /// Push a token back to the front of the stream. The next call to
    /// [Stream::next] returns it.
    fn push_back(&mut self, token: Token);

    /// The position the next token would carry, for error reporting.
    fn position(&self) -> Position;

    fn state(&self) -> &Self::State;

    fn state_mut(&mut self) -> &mut Self::State;

    fn begin_record(&mut self);

    fn commit_record(&mut self);

    fn abort_record(&mut self);
}

/// Recording journal for [Stream] implementations.
///
/// While at least one recording is active, every token returned by the
/// stream is also appended to the innermost recording. Aborting a recording
/// yields the tokens to push back, newest first.
///
/// Implementations must route reads through [Journal::observe] and pushbacks
/// through [Journal::observe_push_back]; pushbacks are assumed to be, and in
/// this crate always are, in LIFO order with respect to reads.
#[derive(Default)]
pub struct Journal {
    frames: Vec<Vec<Token>>,
}

impl Journal {
    pub fn observe(&mut self, token: &Token) {
        if let Some(frame) = self.frames.last_mut() {
            frame.push(token.clone());
        }
    }

    pub fn observe_push_back(&mut self) {
        if let Some(frame) = self.frames.last_mut() {
            frame.pop();
        }
    }

    pub fn begin(&mut self) {
        self.frames.push(Vec::new());
    }

    pub fn commit(&mut self) {
        let frame = self.frames.pop().expect("no recording to commit");
        if let Some(parent) = self.frames.last_mut() {
            parent.extend(frame);
        }
    }

    /// End the innermost recording and return the recorded tokens. The
    /// caller must push them back, last first, without re-observing them.
    pub fn abort(&mut self) -> Vec<Token> {
        self.frames.pop().expect("no recording to abort")
    }
}

/// A parser over streams of type `S`.
///
/// Implemented for all `Fn(&mut S) -> Reply<T>`; combinators both accept and
/// return such functions.
pub trait Parser<S: Stream> {
    type Output;

    fn parse(&self, stream: &mut S) -> Reply<Self::Output>;
}

impl<S: Stream, T, F: Fn(&mut S) -> Reply<T>> Parser<S> for F {
    type Output = T;

    fn parse(&self, stream: &mut S) -> Reply<T> {
        self(stream)
    }
}

/// Succeed without consuming input.
pub fn success<S: Stream, T: Clone>(value: T) -> impl Parser<S, Output = T> {
    move |_: &mut S| Reply::ok(false, value.clone())
}

/// Fail without consuming input.
pub fn fail<S: Stream, T>(message: &'static str) -> impl Parser<S, Output = T> {
    move |stream: &mut S| {
        Reply::err(
            false,
            Box::new(Error::User(UserError::new(stream.position(), message))),
        )
    }
}

/// Consume and return the next token; fail on end of input.
pub fn any<S: Stream>() -> impl Parser<S, Output = Token> {
    |stream: &mut S| match stream.next() {
        Ok(Some(token)) => Reply::ok(true, token),
        Ok(None) => Reply::err(
            false,
            Box::new(Error::User(
                UserError::new(stream.position(), "unexpected end of input")
                    .with_expected("any token"),
            )),
        ),
        Err(error) => Reply::err(true, error),
    }
}

/// Consume the next token if the provided function accepts it.
///
/// On rejection the token is pushed back and the parser fails without
/// consuming input, reporting the expected production.
pub fn satisfy<S: Stream, T>(
    expected: &'static str,
    f: impl Fn(&Token) -> Option<T>,
) -> impl Parser<S, Output = T> {
    move |stream: &mut S| match stream.next() {
        Ok(Some(token)) => match f(&token) {
            Some(value) => Reply::ok(true, value),
            None => {
                let error = UserError::new(token.position(), "")
                    .with_found(token.clone())
                    .with_expected(expected);
                stream.push_back(token);
                Reply::err(false, Box::new(Error::User(error)))
            }
        },
        Ok(None) => Reply::err(
            false,
            Box::new(Error::User(
                UserError::new(stream.position(), "unexpected end of input")
                    .with_expected(expected),
            )),
        ),
        Err(error) => Reply::err(true, error),
    }
}

/// Apply a function to a parser's output.
pub fn map<S: Stream, P: Parser<S>, U>(
    parser: P,
    f: impl Fn(P::Output) -> U,
) -> impl Parser<S, Output = U> {
    move |stream: &mut S| {
        let reply = parser.parse(stream);
        Reply {
            consumed: reply.consumed,
            result: reply.result.map(&f),
        }
    }
}

/// Run one parser, then a second built from its output.
pub fn and_then<S: Stream, P: Parser<S>, Q: Parser<S>>(
    parser: P,
    f: impl Fn(P::Output) -> Q,
) -> impl Parser<S, Output = Q::Output> {
    move |stream: &mut S| {
        let first = parser.parse(stream);
        match first.result {
            Err(_) => first.cast(),
            Ok(value) => {
                let mut second = f(value).parse(stream);
                second.consumed |= first.consumed;
                second
            }
        }
    }
}

/// Deterministic choice.
///
/// The second alternative is only tried if the first failed without
/// consuming input. If both alternatives fail that way, the resulting error
/// carries the merged list of expected productions.
pub fn or<S: Stream, T>(
    first: impl Parser<S, Output = T>,
    second: impl Parser<S, Output = T>,
) -> impl Parser<S, Output = T> {
    move |stream: &mut S| {
        let first_reply = first.parse(stream);
        if !first_reply.recoverable() {
            return first_reply;
        }
        let first_error = match first_reply.result {
            Err(error) => error,
            Ok(_) => unreachable!(),
        };
        let second_reply = second.parse(stream);
        if !second_reply.recoverable() {
            return second_reply;
        }
        let second_error = match second_reply.result {
            Err(error) => error,
            Ok(_) => unreachable!(),
        };
        let (Error::User(a), Error::User(b)) = (*first_error, *second_error) else {
            unreachable!()
        };
        Reply::err(false, Box::new(Error::User(a.merge(b))))
    }
}

/// Convert a consumed failure into an empty one, restoring the stream.
///
/// This is the opt-in for unlimited lookahead: `or(attempt(p), q)` tries `q`
/// even if `p` failed partway through.
pub fn attempt<S: Stream, P: Parser<S>>(parser: P) -> impl Parser<S, Output = P::Output> {
    move |stream: &mut S| {
        stream.begin_record();
        let reply = parser.parse(stream);
        match reply.result {
            Ok(_) => {
                stream.commit_record();
                reply
            }
            Err(_) => {
                stream.abort_record();
                Reply {
                    consumed: false,
                    result: reply.result,
                }
            }
        }
    }
}

/// Run a parser and restore the stream regardless of the result.
pub fn look_ahead<S: Stream, P: Parser<S>>(parser: P) -> impl Parser<S, Output = P::Output> {
    move |stream: &mut S| {
        stream.begin_record();
        let reply = parser.parse(stream);
        stream.abort_record();
        Reply {
            consumed: false,
            result: reply.result,
        }
    }
}

/// Succeed, without consuming input, exactly when the provided parser fails.
pub fn not<S: Stream, P: Parser<S>>(
    parser: P,
    unexpected: &'static str,
) -> impl Parser<S, Output = ()> {
    move |stream: &mut S| {
        stream.begin_record();
        let reply = parser.parse(stream);
        stream.abort_record();
        match reply.result {
            Ok(_) => Reply::err(
                false,
                Box::new(Error::User(UserError::new(
                    stream.position(),
                    format!["unexpected {unexpected}"],
                ))),
            ),
            Err(error) if error.user_error().is_none() => Reply::err(false, error),
            Err(_) => Reply::ok(false, ()),
        }
    }
}

/// Run a parser zero or more times, collecting the outputs.
pub fn many<S: Stream, P: Parser<S>>(parser: P) -> impl Parser<S, Output = Vec<P::Output>> {
    move |stream: &mut S| {
        let mut values = Vec::new();
        let mut consumed = false;
        loop {
            let reply = parser.parse(stream);
            consumed |= reply.consumed;
            match reply.result {
                Ok(value) => {
                    if !reply.consumed {
                        // A non-consuming success would loop forever.
                        panic!("many applied to a parser that succeeds without consuming input");
                    }
                    values.push(value);
                }
                Err(error) => {
                    if reply.consumed || error.user_error().is_none() {
                        return Reply::err(consumed, error);
                    }
                    return Reply::ok(consumed, values);
                }
            }
        }
    }
}

/// Run a parser one or more times, collecting the outputs.
pub fn many1<S: Stream, P: Parser<S>>(parser: P) -> impl Parser<S, Output = Vec<P::Output>> {
    move |stream: &mut S| {
        let first = parser.parse(stream);
        match first.result {
            Err(_) => first.cast(),
            Ok(value) => {
                let mut values = vec![value];
                let mut consumed = first.consumed;
                loop {
                    let reply = parser.parse(stream);
                    consumed |= reply.consumed;
                    match reply.result {
                        Ok(value) => values.push(value),
                        Err(error) => {
                            if reply.consumed || error.user_error().is_none() {
                                return Reply::err(consumed, error);
                            }
                            return Reply::ok(consumed, values);
                        }
                    }
                }
            }
        }
    }
}

/// Run a parser optionally.
pub fn opt<S: Stream, P: Parser<S>>(parser: P) -> impl Parser<S, Output = Option<P::Output>> {
    move |stream: &mut S| {
        let reply = parser.parse(stream);
        match reply.result {
            Ok(value) => Reply::ok(reply.consumed, Some(value)),
            Err(error) => {
                if reply.consumed || error.user_error().is_none() {
                    Reply::err(reply.consumed, error)
                } else {
                    Reply::ok(false, None)
                }
            }
        }
    }
}

/// Run `item` repeatedly until `end` matches; the `end` parser's input is
/// consumed and its output discarded.
pub fn until<S: Stream, P: Parser<S>, E: Parser<S>>(
    item: P,
    end: E,
) -> impl Parser<S, Output = Vec<P::Output>> {
    move |stream: &mut S| {
        let mut values = Vec::new();
        let mut consumed = false;
        loop {
            // Try the terminator with attempt semantics so a partial match
            // is restored before `item` runs.
            stream.begin_record();
            let end_reply = end.parse(stream);
            match end_reply.result {
                Ok(_) => {
                    stream.commit_record();
                    return Reply::ok(consumed | end_reply.consumed, values);
                }
                Err(error) => {
                    stream.abort_record();
                    if error.user_error().is_none() {
                        return Reply::err(consumed, error);
                    }
                }
            }
            let reply = item.parse(stream);
            consumed |= reply.consumed;
            match reply.result {
                Ok(value) => values.push(value),
                Err(error) => return Reply::err(consumed, error),
            }
        }
    }
}

/// Build a value from the user state without consuming input.
pub fn with_state<S: Stream, T>(f: impl Fn(&S::State) -> T) -> impl Parser<S, Output = T> {
    move |stream: &mut S| Reply::ok(false, f(stream.state()))
}

/// Return a clone of the user state.
pub fn get_state<S: Stream>() -> impl Parser<S, Output = S::State>
where
    S::State: Clone,
{
    |stream: &mut S| Reply::ok(false, stream.state().clone())
}

/// Replace the user state.
pub fn set_state<S: Stream>(state: S::State) -> impl Parser<S, Output = ()>
where
    S::State: Clone,
{
    move |stream: &mut S| {
        *stream.state_mut() = state.clone();
        Reply::ok(false, ())
    }
}

/// Update the user state in place.
pub fn update_state<S: Stream>(f: impl Fn(&mut S::State)) -> impl Parser<S, Output = ()> {
    move |stream: &mut S| {
        f(stream.state_mut());
        Reply::ok(false, ())
    }
}

/// Post-process the user state when the parser succeeds.
pub fn post<S: Stream, P: Parser<S>>(
    parser: P,
    f: impl Fn(&mut S::State, &P::Output),
) -> impl Parser<S, Output = P::Output> {
    move |stream: &mut S| {
        let reply = parser.parse(stream);
        if let Ok(value) = &reply.result {
            f(stream.state_mut(), value);
        }
        reply
    }
}

/// Rename the production a parser reports when it fails without consuming
/// input.
pub fn named<S: Stream, P: Parser<S>>(
    parser: P,
    name: &'static str,
) -> impl Parser<S, Output = P::Output> {
    move |stream: &mut S| {
        let reply = parser.parse(stream);
        match reply.result {
            Err(error) if !reply.consumed => {
                let error = match *error {
                    Error::User(mut user_error) => {
                        user_error.expected = vec![Cow::Borrowed(name)];
                        Box::new(Error::User(user_error))
                    }
                    other => Box::new(other),
                };
                Reply::err(false, error)
            }
            result => Reply {
                consumed: reply.consumed,
                result,
            },
        }
    }
}

/// An in-memory stream, used in tests and to parse already-produced token
/// lists (e.g. the body of a token-list register).
pub struct VecStream<U = ()> {
    // The next token is the last element.
    tokens: Vec<Token>,
    journal: Journal,
    state: U,
    end_position: Position,
}

impl VecStream<()> {
    pub fn new(tokens: Vec<Token>) -> VecStream<()> {
        VecStream::with_state(tokens, ())
    }
}

impl<U> VecStream<U> {
    pub fn with_state(mut tokens: Vec<Token>, state: U) -> VecStream<U> {
        tokens.reverse();
        VecStream {
            tokens,
            journal: Journal::default(),
            state,
            end_position: Position::default(),
        }
    }

    /// The tokens that have not been consumed yet.
    pub fn remaining(mut self) -> Vec<Token> {
        self.tokens.reverse();
        self.tokens
    }
}

impl<U> Stream for VecStream<U> {
    type State = U;

    fn next(&mut self) -> crate::Result<Option<Token>> {
        let token = self.tokens.pop();
        if let Some(token) = &token {
            self.end_position = token.position();
            self.journal.observe(token);
        }
        Ok(token)
    }

    fn push_back(&mut self, token: Token) {
        self.journal.observe_push_back();
        self.tokens.push(token);
    }

    fn position(&self) -> Position {
        match self.tokens.last() {
            Some(token) => token.position(),
            None => self.end_position,
        }
    }

    fn state(&self) -> &U {
        &self.state
    }

    fn state_mut(&mut self) -> &mut U {
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
            self.tokens.push(token);
        }
    }
}
