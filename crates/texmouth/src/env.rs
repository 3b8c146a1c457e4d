//! The environment: scoped tables of category codes, command bindings,
//! registers and internal parameters.
//!
//! The environment is a stack of frames. Lookups walk the stack toward the
//! root; writes target the current frame by default or the root frame when
//! marked global. [Environment::begin_group] pushes a fresh frame on every
//! table and [Environment::end_group] pops it, rolling back all mutations
//! made inside the group.

use crate::command::Command;
use crate::command::Primitive;
use crate::token::CatCode;
use crate::token::CommandRef;
use crate::token::Token;
use crate::types::Dimen;
use crate::types::Glue;
use crate::types::Mode;
use texmouth_stdext::collections::scopedmap::ScopedMap;

/// The default `\escapechar`, a backslash.
pub const DEFAULT_ESCAPE_CHAR: i32 = '\\' as i32;

/// Scoped state read and written by the eyes, the mouth, and the downstream
/// engine.
pub struct Environment {
    cat_codes: ScopedMap<char, CatCode>,
    commands: ScopedMap<CommandRef, Command>,
    counts: ScopedMap<u8, i32>,
    dimens: ScopedMap<u8, Dimen>,
    skips: ScopedMap<u8, Glue>,
    muskips: ScopedMap<u8, Glue>,
    toks: ScopedMap<u8, Vec<Token>>,
    escape_char: ScopedMap<(), i32>,
    mode: Mode,
    group_depth: usize,
}

impl Environment {
    /// Create an environment with INITEX-style category codes: only the
    /// escape character, end of line, space, null, percent and the letters
    /// are special.
    pub fn new() -> Environment {
        let mut env = Environment {
            cat_codes: ScopedMap::new(),
            commands: ScopedMap::new(),
            counts: ScopedMap::new(),
            dimens: ScopedMap::new(),
            skips: ScopedMap::new(),
            muskips: ScopedMap::new(),
            toks: ScopedMap::new(),
            escape_char: ScopedMap::new(),
            mode: Mode::default(),
            group_depth: 0,
        };
        for primitive in Primitive::ALL {
            env.commands.insert(
                CommandRef::ControlSequence(primitive.name().into()),
                Command::Primitive(*primitive),
            );
        }
        env
    }

    /// Create an environment with plain TeX's category code assignments
    /// (`{`=1, `}`=2, `$`=3, `&`=4, `#`=6, `^`=7, `_`=8, `~`=13).
    pub fn new_plain() -> Environment {
        let mut env = Environment::new();
        for c in ['{', '}', '$', '&', '#', '^', '_', '~', '\t', '\u{0}', '\u{7F}'] {
            env.cat_codes.insert(c, CatCode::plain_tex(c));
        }
        env
    }

    /// The category code of the provided character, right now.
    pub fn cat_code(&self, c: char) -> CatCode {
        match self.cat_codes.get(&c) {
            Some(cat_code) => *cat_code,
            None => CatCode::ini_tex(c),
        }
    }

    pub fn set_cat_code(&mut self, c: char, cat_code: CatCode) {
        self.cat_codes.insert(c, cat_code);
    }

    pub fn set_cat_code_global(&mut self, c: char, cat_code: CatCode) {
        self.cat_codes.insert_global(c, cat_code);
    }

    /// The current meaning of the provided command reference, if any.
    pub fn command(&self, command_ref: &CommandRef) -> Option<&Command> {
        self.commands.get(command_ref)
    }

    /// The current meaning of the control sequence with the provided name.
    pub fn command_named(&self, name: &str) -> Option<&Command> {
        self.commands
            .get(&CommandRef::ControlSequence(name.into()))
    }

    pub fn set_command(&mut self, command_ref: CommandRef, command: Command) {
        self.commands.insert(command_ref, command);
    }

    pub fn set_command_global(&mut self, command_ref: CommandRef, command: Command) {
        self.commands.insert_global(command_ref, command);
    }

    /// Bind a command under a name. Convenience for tests and for the
    /// downstream engine's `\countdef` family.
    pub fn set_command_named<N: Into<std::rc::Rc<str>>>(&mut self, name: N, command: Command) {
        self.commands
            .insert(CommandRef::ControlSequence(name.into()), command);
    }

    pub fn count(&self, index: u8) -> i32 {
        self.counts.get(&index).copied().unwrap_or(0)
    }

    pub fn set_count(&mut self, index: u8, value: i32) {
        self.counts.insert(index, value);
    }

    pub fn set_count_global(&mut self, index: u8, value: i32) {
        self.counts.insert_global(index, value);
    }

    pub fn dimen(&self, index: u8) -> Dimen {
        self.dimens.get(&index).copied().unwrap_or_default()
    }

    pub fn set_dimen(&mut self, index: u8, value: Dimen) {
        self.dimens.insert(index, value);
    }

    pub fn skip(&self, index: u8) -> Glue {
        self.skips.get(&index).copied().unwrap_or_default()
    }

    pub fn set_skip(&mut self, index: u8, value: Glue) {
        self.skips.insert(index, value);
    }

    pub fn muskip(&self, index: u8) -> Glue {
        self.muskips.get(&index).copied().unwrap_or_default()
    }

    pub fn set_muskip(&mut self, index: u8, value: Glue) {
        self.muskips.insert(index, value);
    }

    pub fn toks(&self, index: u8) -> &[Token] {
        match self.toks.get(&index) {
            Some(tokens) => tokens,
            None => &[],
        }
    }

    pub fn set_toks(&mut self, index: u8, tokens: Vec<Token>) {
        self.toks.insert(index, tokens);
    }

    /// The current `\escapechar`.
    ///
    /// A negative value (or one outside the character range) means control
    /// sequences are rendered without an escape character.
    pub fn escape_char(&self) -> i32 {
        self.escape_char
            .get(&())
            .copied()
            .unwrap_or(DEFAULT_ESCAPE_CHAR)
    }

    pub fn set_escape_char(&mut self, value: i32) {
        self.escape_char.insert((), value);
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Set the mode. Mode transitions are owned by the downstream engine.
    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    /// Enter a group: push a fresh frame on every table.
    pub fn begin_group(&mut self) {
        self.cat_codes.begin_scope();
        self.commands.begin_scope();
        self.counts.begin_scope();
        self.dimens.begin_scope();
        self.skips.begin_scope();
        self.muskips.begin_scope();
        self.toks.begin_scope();
        self.escape_char.begin_scope();
        self.group_depth += 1;
    }

    /// Leave a group, rolling back all scoped mutations made inside it.
    /// Returns false if there is no group to leave.
    #[must_use]
    pub fn end_group(&mut self) -> bool {
        if self.group_depth == 0 {
            return false;
        }
        let ended = self.cat_codes.end_scope()
            && self.commands.end_scope()
            && self.counts.end_scope()
            && self.dimens.end_scope()
            && self.skips.end_scope()
            && self.muskips.end_scope()
            && self.toks.end_scope()
            && self.escape_char.end_scope();
        assert!(ended, "scoped tables out of sync with group depth");
        self.group_depth -= 1;
        true
    }

    /// The current group nesting depth.
    pub fn group_depth(&self) -> usize {
        self.group_depth
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitives_are_bound_at_the_root() {
        let env = Environment::new();
        assert_eq!(
            env.command_named("def"),
            Some(&Command::Primitive(Primitive::Def))
        );
        assert_eq!(
            env.command_named("expandafter"),
            Some(&Command::Primitive(Primitive::ExpandAfter))
        );
        assert_eq!(env.command_named("undefined"), None);
    }

    #[test]
    fn cat_code_mutations_roll_back() {
        let mut env = Environment::new();
        assert_eq!(env.cat_code('W'), CatCode::Letter);
        env.begin_group();
        env.set_cat_code('W', CatCode::Other);
        assert_eq!(env.cat_code('W'), CatCode::Other);
        assert!(env.end_group());
        assert_eq!(env.cat_code('W'), CatCode::Letter);
    }

    #[test]
    fn global_write_survives_group_end() {
        let mut env = Environment::new();
        env.begin_group();
        env.set_count(0, 1);
        env.set_count_global(1, 2);
        assert!(env.end_group());
        assert_eq!(env.count(0), 0);
        assert_eq!(env.count(1), 2);
    }

    #[test]
    fn end_group_without_group() {
        let mut env = Environment::new();
        assert!(!env.end_group());
    }

    #[test]
    fn plain_environment_assigns_special_characters() {
        let env = Environment::new_plain();
        assert_eq!(env.cat_code('{'), CatCode::BeginGroup);
        assert_eq!(env.cat_code('#'), CatCode::Parameter);
        assert_eq!(env.cat_code('~'), CatCode::Active);
        assert_eq!(env.cat_code('@'), CatCode::Other);
    }

    #[test]
    fn escape_char_default() {
        let env = Environment::new();
        assert_eq!(env.escape_char(), '\\' as i32);
    }
}
