//! Category codes.

/// Category code assigned to a character.
///
/// Every character in the input is assigned one of sixteen category codes
/// by looking up the environment's category-code table at the moment the
/// character is read. The category determines the character's role in
/// lexing: whether it starts a control sequence, opens a group, is plain
/// text, and so on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CatCode {
    Escape = 0,
    BeginGroup = 1,
    EndGroup = 2,
    MathShift = 3,
    AlignmentTab = 4,
    EndOfLine = 5,
    Parameter = 6,
    Superscript = 7,
    Subscript = 8,
    Ignored = 9,
    Space = 10,
    Letter = 11,
    Other = 12,
    Active = 13,
    Comment = 14,
    Invalid = 15,
}

impl Default for CatCode {
    fn default() -> Self {
        CatCode::Other
    }
}

impl std::fmt::Display for CatCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", *self as u8, self.name())
    }
}

impl TryFrom<u8> for CatCode {
    type Error = u8;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        use CatCode::*;
        match value {
            0 => Ok(Escape),
            1 => Ok(BeginGroup),
            2 => Ok(EndGroup),
            3 => Ok(MathShift),
            4 => Ok(AlignmentTab),
            5 => Ok(EndOfLine),
            6 => Ok(Parameter),
            7 => Ok(Superscript),
            8 => Ok(Subscript),
            9 => Ok(Ignored),
            10 => Ok(Space),
            11 => Ok(Letter),
            12 => Ok(Other),
            13 => Ok(Active),
            14 => Ok(Comment),
            15 => Ok(Invalid),
            _ => Err(value),
        }
    }
}

impl CatCode {
    /// Human readable name of the category code.
    pub fn name(&self) -> &'static str {
        use CatCode::*;
        match self {
            Escape => "escape",
            BeginGroup => "begin group",
            EndGroup => "end group",
            MathShift => "math shift",
            AlignmentTab => "alignment tab",
            EndOfLine => "end of line",
            Parameter => "parameter",
            Superscript => "superscript",
            Subscript => "subscript",
            Ignored => "ignored",
            Space => "space",
            Letter => "letter",
            Other => "other",
            Active => "active",
            Comment => "comment",
            Invalid => "invalid",
        }
    }

    /// Category code assignments used in plain TeX.
    ///
    /// These are the INITEX defaults plus plain TeX's assignments for the
    /// special printable characters. The table is indexed by character code;
    /// characters beyond the table default to [CatCode::Other].
    pub fn plain_tex(c: char) -> CatCode {
        use CatCode::*;
        match c {
            '\\' => Escape,
            '{' => BeginGroup,
            '}' => EndGroup,
            '$' => MathShift,
            '&' => AlignmentTab,
            '\n' => EndOfLine,
            '#' => Parameter,
            '^' => Superscript,
            '_' => Subscript,
            '\u{0}' => Ignored,
            ' ' | '\t' => Space,
            'a'..='z' | 'A'..='Z' => Letter,
            '~' => Active,
            '%' => Comment,
            '\u{7F}' => Invalid,
            _ => Other,
        }
    }

    /// Category code assignments INITEX starts with.
    ///
    /// Only the escape character, end of line, space, null, percent and the
    /// letters are special; everything else is [CatCode::Other].
    pub fn ini_tex(c: char) -> CatCode {
        use CatCode::*;
        match c {
            '\\' => Escape,
            '\n' => EndOfLine,
            '\u{0}' => Invalid,
            ' ' => Space,
            'a'..='z' | 'A'..='Z' => Letter,
            '%' => Comment,
            _ => Other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_u8_values_round_trip() {
        for i in 0_u8..16 {
            let cat_code = CatCode::try_from(i).unwrap();
            assert_eq!(cat_code as u8, i);
        }
        assert_eq!(CatCode::try_from(16), Err(16));
    }

    #[test]
    fn plain_tex_assignments() {
        assert_eq!(CatCode::plain_tex('\\'), CatCode::Escape);
        assert_eq!(CatCode::plain_tex('{'), CatCode::BeginGroup);
        assert_eq!(CatCode::plain_tex('}'), CatCode::EndGroup);
        assert_eq!(CatCode::plain_tex('$'), CatCode::MathShift);
        assert_eq!(CatCode::plain_tex('#'), CatCode::Parameter);
        assert_eq!(CatCode::plain_tex('^'), CatCode::Superscript);
        assert_eq!(CatCode::plain_tex('_'), CatCode::Subscript);
        assert_eq!(CatCode::plain_tex('~'), CatCode::Active);
        assert_eq!(CatCode::plain_tex('A'), CatCode::Letter);
        assert_eq!(CatCode::plain_tex('1'), CatCode::Other);
    }

    #[test]
    fn ini_tex_has_no_grouping_characters() {
        assert_eq!(CatCode::ini_tex('{'), CatCode::Other);
        assert_eq!(CatCode::ini_tex('}'), CatCode::Other);
        assert_eq!(CatCode::ini_tex('#'), CatCode::Other);
        assert_eq!(CatCode::ini_tex('\\'), CatCode::Escape);
        assert_eq!(CatCode::ini_tex('z'), CatCode::Letter);
    }
}
