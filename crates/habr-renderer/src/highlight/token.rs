//! Token classification.
//!
//! Syntect reports TextMate scope stacks. The formatter works on a small
//! fixed hierarchy instead, so that a theme can be sampled once per class and
//! a token with an unstyled class falls back to its nearest styled ancestor.

use syntect::parsing::Scope;

/// Classification of a highlighted token.
///
/// Classes form a tree rooted at [`TokenClass::Token`]; see [`TokenClass::parent`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenClass {
    Token,
    Text,
    Comment,
    CommentSingle,
    CommentMultiline,
    CommentPreproc,
    Keyword,
    KeywordConstant,
    KeywordDeclaration,
    KeywordType,
    Name,
    NameBuiltin,
    NameClass,
    NameFunction,
    NameTag,
    NameAttribute,
    NameVariable,
    NameConstant,
    Literal,
    LiteralString,
    LiteralStringEscape,
    LiteralStringRegex,
    LiteralNumber,
    Operator,
    Punctuation,
    Error,
    Generic,
    GenericInserted,
    GenericDeleted,
    GenericHeading,
    GenericEmph,
    GenericStrong,
}

/// Scope prefixes mapped to classes. Within one scope the first matching
/// prefix wins, so more specific prefixes come first.
const SCOPE_CLASSES: &[(&str, TokenClass)] = &[
    ("punctuation.definition.string", TokenClass::LiteralString),
    ("punctuation.definition.comment", TokenClass::Comment),
    ("comment.line", TokenClass::CommentSingle),
    ("comment.block", TokenClass::CommentMultiline),
    ("comment", TokenClass::Comment),
    ("meta.preprocessor", TokenClass::CommentPreproc),
    ("keyword.operator", TokenClass::Operator),
    ("keyword.declaration", TokenClass::KeywordDeclaration),
    ("keyword", TokenClass::Keyword),
    ("storage.type", TokenClass::KeywordType),
    ("storage", TokenClass::KeywordDeclaration),
    ("constant.language", TokenClass::KeywordConstant),
    ("constant.numeric", TokenClass::LiteralNumber),
    ("constant.character.escape", TokenClass::LiteralStringEscape),
    ("constant.other", TokenClass::NameConstant),
    ("constant", TokenClass::Literal),
    ("string.regexp", TokenClass::LiteralStringRegex),
    ("string", TokenClass::LiteralString),
    ("entity.name.class", TokenClass::NameClass),
    ("entity.name.type", TokenClass::NameClass),
    ("entity.name.function", TokenClass::NameFunction),
    ("entity.name.tag", TokenClass::NameTag),
    ("entity.other.attribute-name", TokenClass::NameAttribute),
    ("entity", TokenClass::Name),
    ("support.function", TokenClass::NameBuiltin),
    ("support", TokenClass::NameBuiltin),
    ("variable.function", TokenClass::NameFunction),
    ("variable.other.constant", TokenClass::NameConstant),
    ("variable", TokenClass::NameVariable),
    ("punctuation", TokenClass::Punctuation),
    ("invalid", TokenClass::Error),
    ("markup.inserted", TokenClass::GenericInserted),
    ("markup.deleted", TokenClass::GenericDeleted),
    ("markup.heading", TokenClass::GenericHeading),
    ("markup.italic", TokenClass::GenericEmph),
    ("markup.bold", TokenClass::GenericStrong),
    ("markup", TokenClass::Generic),
];

impl TokenClass {
    /// Every class, root first.
    pub const ALL: [Self; 32] = [
        Self::Token,
        Self::Text,
        Self::Comment,
        Self::CommentSingle,
        Self::CommentMultiline,
        Self::CommentPreproc,
        Self::Keyword,
        Self::KeywordConstant,
        Self::KeywordDeclaration,
        Self::KeywordType,
        Self::Name,
        Self::NameBuiltin,
        Self::NameClass,
        Self::NameFunction,
        Self::NameTag,
        Self::NameAttribute,
        Self::NameVariable,
        Self::NameConstant,
        Self::Literal,
        Self::LiteralString,
        Self::LiteralStringEscape,
        Self::LiteralStringRegex,
        Self::LiteralNumber,
        Self::Operator,
        Self::Punctuation,
        Self::Error,
        Self::Generic,
        Self::GenericInserted,
        Self::GenericDeleted,
        Self::GenericHeading,
        Self::GenericEmph,
        Self::GenericStrong,
    ];

    /// The more general class, or `None` for the root.
    #[must_use]
    pub fn parent(self) -> Option<Self> {
        let parent = match self {
            Self::Token => return None,
            Self::Text
            | Self::Comment
            | Self::Keyword
            | Self::Name
            | Self::Literal
            | Self::Operator
            | Self::Punctuation
            | Self::Error
            | Self::Generic => Self::Token,
            Self::CommentSingle | Self::CommentMultiline | Self::CommentPreproc => Self::Comment,
            Self::KeywordConstant | Self::KeywordDeclaration | Self::KeywordType => Self::Keyword,
            Self::NameBuiltin
            | Self::NameClass
            | Self::NameFunction
            | Self::NameTag
            | Self::NameAttribute
            | Self::NameVariable
            | Self::NameConstant => Self::Name,
            Self::LiteralString | Self::LiteralNumber => Self::Literal,
            Self::LiteralStringEscape | Self::LiteralStringRegex => Self::LiteralString,
            Self::GenericInserted
            | Self::GenericDeleted
            | Self::GenericHeading
            | Self::GenericEmph
            | Self::GenericStrong => Self::Generic,
        };
        Some(parent)
    }

    /// Scope used to sample a theme for this class.
    ///
    /// `None` for classes that are never styled on their own.
    #[must_use]
    pub fn sample_scope(self) -> Option<&'static str> {
        let scope = match self {
            Self::Token | Self::Text => return None,
            Self::Comment => "comment",
            Self::CommentSingle => "comment.line",
            Self::CommentMultiline => "comment.block",
            Self::CommentPreproc => "meta.preprocessor",
            Self::Keyword => "keyword",
            Self::KeywordConstant => "constant.language",
            Self::KeywordDeclaration => "storage.modifier",
            Self::KeywordType => "storage.type",
            Self::Name => "entity.name",
            Self::NameBuiltin => "support.function",
            Self::NameClass => "entity.name.class",
            Self::NameFunction => "entity.name.function",
            Self::NameTag => "entity.name.tag",
            Self::NameAttribute => "entity.other.attribute-name",
            Self::NameVariable => "variable",
            Self::NameConstant => "variable.other.constant",
            Self::Literal => "constant",
            Self::LiteralString => "string",
            Self::LiteralStringEscape => "constant.character.escape",
            Self::LiteralStringRegex => "string.regexp",
            Self::LiteralNumber => "constant.numeric",
            Self::Operator => "keyword.operator",
            Self::Punctuation => "punctuation",
            Self::Error => "invalid",
            Self::Generic => "markup",
            Self::GenericInserted => "markup.inserted",
            Self::GenericDeleted => "markup.deleted",
            Self::GenericHeading => "markup.heading",
            Self::GenericEmph => "markup.italic",
            Self::GenericStrong => "markup.bold",
        };
        Some(scope)
    }

    /// Classify a scope stack, innermost scope first.
    ///
    /// Stacks with no recognized scope are [`TokenClass::Text`].
    #[must_use]
    pub fn classify(stack: &[Scope]) -> Self {
        stack
            .iter()
            .rev()
            .find_map(|scope| Self::for_scope(&scope.build_string()))
            .unwrap_or(Self::Text)
    }

    fn for_scope(scope: &str) -> Option<Self> {
        SCOPE_CLASSES
            .iter()
            .find(|(prefix, _)| has_scope_prefix(scope, prefix))
            .map(|&(_, class)| class)
    }
}

/// Check whether `prefix` is a prefix of `scope` on atom boundaries.
fn has_scope_prefix(scope: &str, prefix: &str) -> bool {
    scope
        .strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('.'))
}
