//! Commands: the meanings control sequences can be bound to.

use crate::texmacro::Macro;
use crate::types::Font;
use std::rc::Rc;

/// The meaning of a control sequence.
///
/// Lookup of a [CommandRef](crate::token::CommandRef) in the environment
/// yields one of these. Equality is the `\ifx` notion of equality: macros
/// compare structurally, everything else by value.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// A primitive built into the engine.
    Primitive(Primitive),
    /// A user-defined macro.
    Macro(Rc<Macro>),
    /// A count register reference created by `\countdef`.
    CountDef(u8),
    /// A dimen register reference created by `\dimendef`.
    DimenDef(u8),
    /// A skip register reference created by `\skipdef`.
    SkipDef(u8),
    /// A muskip register reference created by `\muskipdef`.
    MuskipDef(u8),
    /// A character constant created by `\chardef`.
    CharDef(char),
    /// A math character constant created by `\mathchardef`.
    MathCharDef(u16),
    /// A token list register reference created by `\toksdef`.
    ToksDef(u8),
    /// A font selector.
    Font(Font),
}

macro_rules! primitives {
    ( $( ($variant: ident, $name: expr), )+ ) => {
        /// A primitive built into the engine.
        ///
        /// The expandable primitives are handled by the mouth itself; the
        /// rest ([Primitive::Relax], [Primitive::Par]) pass through to the
        /// downstream consumer unchanged.
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum Primitive {
            $( $variant, )+
        }

        impl Primitive {
            /// The name the primitive is bound to in the root environment.
            pub fn name(&self) -> &'static str {
                match self {
                    $( Primitive::$variant => $name, )+
                }
            }

            /// All primitives, for populating the root environment.
            pub const ALL: &'static [Primitive] = &[
                $( Primitive::$variant, )+
            ];
        }
    };
}

primitives![
    (Def, "def"),
    (Edef, "edef"),
    (Gdef, "gdef"),
    (Xdef, "xdef"),
    (Global, "global"),
    (Long, "long"),
    (Outer, "outer"),
    (Number, "number"),
    (RomanNumeral, "romannumeral"),
    (String, "string"),
    (JobName, "jobname"),
    (FontName, "fontname"),
    (Meaning, "meaning"),
    (CsName, "csname"),
    (EndCsName, "endcsname"),
    (ExpandAfter, "expandafter"),
    (NoExpand, "noexpand"),
    (Input, "input"),
    (EndInput, "endinput"),
    (The, "the"),
    (If, "if"),
    (IfCat, "ifcat"),
    (IfX, "ifx"),
    (IfNum, "ifnum"),
    (IfDim, "ifdim"),
    (IfOdd, "ifodd"),
    (IfVMode, "ifvmode"),
    (IfHMode, "ifhmode"),
    (IfMMode, "ifmmode"),
    (IfInner, "ifinner"),
    (Else, "else"),
    (Fi, "fi"),
    (Relax, "relax"),
    (Par, "par"),
];

impl Primitive {
    /// True for the `\if…` conditionals. Used when skipping a branch to
    /// track nesting.
    pub fn is_conditional(&self) -> bool {
        use Primitive::*;
        matches!(
            self,
            If | IfCat | IfX | IfNum | IfDim | IfOdd | IfVMode | IfHMode | IfMMode | IfInner
        )
    }
}

impl From<Primitive> for Command {
    fn from(primitive: Primitive) -> Self {
        Command::Primitive(primitive)
    }
}

impl From<Rc<Macro>> for Command {
    fn from(tex_macro: Rc<Macro>) -> Self {
        Command::Macro(tex_macro)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitive_names_are_unique() {
        let mut names: Vec<&'static str> = Primitive::ALL.iter().map(|p| p.name()).collect();
        let len = names.len();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), len);
    }

    #[test]
    fn conditional_primitives() {
        assert!(Primitive::IfNum.is_conditional());
        assert!(Primitive::IfInner.is_conditional());
        assert!(!Primitive::Else.is_conditional());
        assert!(!Primitive::Fi.is_conditional());
    }
}
