//! Token definitions for Chronovyan

use logos::Logos;

use crate::scan::{self, LexError, LexExtras};

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[logos(extras = LexExtras)]
#[logos(error = LexError)]
#[logos(skip r"[ \t\r\n\f]+")]  // Skip whitespace
#[logos(skip r"//[^\n]*")]      // Skip line comments
pub enum TokenKind {
    // === Single-character punctuation ===
    #[token("(")]
    LeftParen,
    #[token(")")]
    RightParen,
    #[token("{")]
    LeftBrace,
    #[token("}")]
    RightBrace,
    #[token("[")]
    LeftBracket,
    #[token("]")]
    RightBracket,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token("-")]
    Minus,
    #[token("+")]
    Plus,
    #[token(";")]
    Semicolon,
    #[token("/")]
    Slash,
    #[token("*")]
    Star,
    #[token("%")]
    Percent,
    #[token(":")]
    Colon,

    // === One or two character operators ===
    #[token("!")]
    Bang,
    #[token("!=")]
    BangEqual,
    #[token("=")]
    Equal,
    #[token("==")]
    EqualEqual,
    #[token(">")]
    Greater,
    #[token(">=")]
    GreaterEqual,
    #[token("<")]
    Less,
    #[token("<=")]
    LessEqual,
    #[token("++")]
    PlusPlus,
    #[token("--")]
    MinusMinus,
    #[token("+=")]
    PlusEqual,
    #[token("-=")]
    MinusEqual,
    #[token("*=")]
    StarEqual,
    #[token("/=")]
    SlashEqual,
    #[token("%=")]
    PercentEqual,
    #[token("::")]
    ColonColon,
    #[token("->")]
    Arrow,
    #[token("&&")]
    And,
    #[token("||")]
    Or,

    // === Literals ===
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Identifier,
    #[token("\"", scan::string)]
    String,
    #[regex(r"[0-9][0-9_]*", scan::decimal)]
    #[regex(r"0[xX][0-9a-zA-Z_]*", scan::hex)]
    #[regex(r"0[bB][0-9a-zA-Z_]*", scan::binary)]
    #[regex(r"0[oO][0-9a-zA-Z_]*", scan::octal)]
    Integer,
    #[regex(r"[0-9][0-9_]*\.[0-9][0-9_]*([eE][+-]?[0-9]+)?", scan::float)]
    #[regex(r"[0-9][0-9_]*[eE][+-]?[0-9]+", scan::float)]
    Float,
    #[token("'", scan::character)]
    Character,

    /// Nested `/* */` comment; never emitted, the callback skips it
    #[token("/*", scan::block_comment)]
    BlockComment,

    // === Keywords (resolved from identifiers, see `keyword`) ===
    // Declarations and control flow
    Let,
    Const,
    If,
    Else,
    While,
    For,
    Function,
    Return,
    True,
    False,
    Null,
    Static,
    Volatile,
    Import,
    Export,

    // Block types and declarations
    Antecedence,
    Concurrency,
    Consequence,
    Declare,
    Flux,
    SourceInfused,

    // Temporal types
    WeavePattern,
    TemporalSignature,
    AethelReserve,
    ChrononStream,

    // Temporal operations
    Infuse,
    RewindTo,
    Guard,
    CatchTemporal,
    Dejavu,
    LootTable,
    ParadoxLevel,
    BranchTimeline,
    MergeTimelines,
    RewindFlow,
    ReverseFlow,
    ParallelExecution,
    Anchor,
    Weaver,

    // Resources
    Chronon,
    Aethel,
    AllocateResources,
    ExpendResources,
    BorrowResources,
    RepayDebt,

    // === Special ===
    Error,
    EndOfFile,
}

impl TokenKind {
    /// Get a human-readable description of this token kind
    pub fn describe(&self) -> &'static str {
        match self {
            TokenKind::LeftParen => "'('",
            TokenKind::RightParen => "')'",
            TokenKind::LeftBrace => "'{'",
            TokenKind::RightBrace => "'}'",
            TokenKind::LeftBracket => "'['",
            TokenKind::RightBracket => "']'",
            TokenKind::Comma => "','",
            TokenKind::Dot => "'.'",
            TokenKind::Minus => "'-'",
            TokenKind::Plus => "'+'",
            TokenKind::Semicolon => "';'",
            TokenKind::Slash => "'/'",
            TokenKind::Star => "'*'",
            TokenKind::Percent => "'%'",
            TokenKind::Colon => "':'",
            TokenKind::Bang => "'!'",
            TokenKind::BangEqual => "'!='",
            TokenKind::Equal => "'='",
            TokenKind::EqualEqual => "'=='",
            TokenKind::Greater => "'>'",
            TokenKind::GreaterEqual => "'>='",
            TokenKind::Less => "'<'",
            TokenKind::LessEqual => "'<='",
            TokenKind::PlusPlus => "'++'",
            TokenKind::MinusMinus => "'--'",
            TokenKind::PlusEqual => "'+='",
            TokenKind::MinusEqual => "'-='",
            TokenKind::StarEqual => "'*='",
            TokenKind::SlashEqual => "'/='",
            TokenKind::PercentEqual => "'%='",
            TokenKind::ColonColon => "'::'",
            TokenKind::Arrow => "'->'",
            TokenKind::And => "'&&'",
            TokenKind::Or => "'||'",
            TokenKind::Identifier => "identifier",
            TokenKind::String => "string literal",
            TokenKind::Integer => "integer literal",
            TokenKind::Float => "float literal",
            TokenKind::Character => "character literal",
            TokenKind::BlockComment => "comment",
            TokenKind::Error => "invalid token",
            TokenKind::EndOfFile => "end of file",
            kw if kw.is_keyword() => "keyword",
            _ => "token",
        }
    }

    pub fn is_keyword(&self) -> bool {
        (*self as u16) >= (TokenKind::Let as u16) && (*self as u16) <= (TokenKind::RepayDebt as u16)
    }

    /// Resource-operation keywords that introduce a resource statement
    pub fn is_resource_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::AllocateResources
                | TokenKind::ExpendResources
                | TokenKind::BorrowResources
                | TokenKind::RepayDebt
        )
    }

    /// Tokens that begin a statement or declaration; used as restart points
    /// after a syntax error
    pub fn starts_statement(&self) -> bool {
        matches!(
            self,
            TokenKind::If
                | TokenKind::While
                | TokenKind::For
                | TokenKind::Function
                | TokenKind::Let
                | TokenKind::Const
                | TokenKind::Return
                | TokenKind::AllocateResources
                | TokenKind::ExpendResources
                | TokenKind::BorrowResources
                | TokenKind::RepayDebt
                | TokenKind::BranchTimeline
                | TokenKind::MergeTimelines
                | TokenKind::RewindFlow
                | TokenKind::ReverseFlow
                | TokenKind::ParallelExecution
        )
    }
}

/// Resolve an identifier to a keyword kind
///
/// Matching is case-insensitive. When the exact spelling is not a keyword,
/// underscores are stripped and the lookup is retried, so `BranchTimeline`
/// and `BRANCH_TIMELINE` name the same keyword.
pub fn keyword(ident: &str) -> Option<TokenKind> {
    let upper = ident.to_ascii_uppercase();
    lookup_keyword(&upper).or_else(|| {
        if upper.contains('_') {
            lookup_keyword(&upper.replace('_', ""))
        } else {
            None
        }
    })
}

fn lookup_keyword(word: &str) -> Option<TokenKind> {
    let kind = match word {
        "LET" => TokenKind::Let,
        "CONST" => TokenKind::Const,
        "IF" => TokenKind::If,
        "ELSE" => TokenKind::Else,
        "WHILE" => TokenKind::While,
        "FOR" => TokenKind::For,
        "FUNCTION" => TokenKind::Function,
        "RETURN" => TokenKind::Return,
        "TRUE" => TokenKind::True,
        "FALSE" => TokenKind::False,
        "NULL" => TokenKind::Null,
        "STATIC" => TokenKind::Static,
        "VOLATILE" => TokenKind::Volatile,
        "IMPORT" => TokenKind::Import,
        "EXPORT" => TokenKind::Export,
        "ANTECEDENCE" => TokenKind::Antecedence,
        "CONCURRENCY" => TokenKind::Concurrency,
        "CONSEQUENCE" => TokenKind::Consequence,
        "DECLARE" => TokenKind::Declare,
        "FLUX" => TokenKind::Flux,
        "SOURCE_INFUSED" | "SOURCEINFUSED" => TokenKind::SourceInfused,
        "WEAVE_PATTERN" | "WEAVEPATTERN" => TokenKind::WeavePattern,
        "TEMPORAL_SIGNATURE" | "TEMPORALSIGNATURE" => TokenKind::TemporalSignature,
        "AETHEL_RESERVE" | "AETHELRESERVE" => TokenKind::AethelReserve,
        "CHRONON_STREAM" | "CHRONONSTREAM" => TokenKind::ChrononStream,
        "INFUSE" => TokenKind::Infuse,
        "REWIND_TO" | "REWINDTO" => TokenKind::RewindTo,
        "GUARD" => TokenKind::Guard,
        "CATCH_TEMPORAL" | "CATCHTEMPORAL" => TokenKind::CatchTemporal,
        "DEJAVU" => TokenKind::Dejavu,
        "LOOT_TABLE" | "LOOTTABLE" => TokenKind::LootTable,
        "PARADOX_LEVEL" | "PARADOXLEVEL" => TokenKind::ParadoxLevel,
        "BRANCH_TIMELINE" | "BRANCHTIMELINE" => TokenKind::BranchTimeline,
        "MERGE_TIMELINES" | "MERGETIMELINES" => TokenKind::MergeTimelines,
        "REWIND_FLOW" | "REWINDFLOW" => TokenKind::RewindFlow,
        "REVERSE_FLOW" | "REVERSEFLOW" => TokenKind::ReverseFlow,
        "PARALLEL_EXECUTION" | "PARALLELEXECUTION" => TokenKind::ParallelExecution,
        "ANCHOR" => TokenKind::Anchor,
        "WEAVER" => TokenKind::Weaver,
        "CHRONON" => TokenKind::Chronon,
        "AETHEL" => TokenKind::Aethel,
        "ALLOCATE_RESOURCES" | "ALLOCATERESOURCES" => TokenKind::AllocateResources,
        "EXPEND_RESOURCES" | "EXPENDRESOURCES" => TokenKind::ExpendResources,
        "BORROW_RESOURCES" | "BORROWRESOURCES" => TokenKind::BorrowResources,
        "REPAY_DEBT" | "REPAYDEBT" => TokenKind::RepayDebt,
        _ => return None,
    };
    Some(kind)
}
