use thiserror::Error;

/// Largest value a data word or address may carry.
pub const WORD_MAX: u32 = 0o177777;

/// Largest value a `b` directive may carry.
pub const BYTE_MAX: u32 = 0o377;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum LineError {
    #[error("syntax error \"{0}\"")]
    Syntax(String),
}

/// One classified source line.
#[derive(Debug, PartialEq, Eq)]
pub enum Line<'a> {
    /// `#define SYMBOL`
    Define(&'a str),
    /// `#error TEXT`, reported as a translation error
    UserError(&'a str),
    /// `#warning TEXT`, reported as a note
    UserWarning(&'a str),
    /// `#ifdef SYMBOL`
    Ifdef(&'a str),
    /// `#if 1` / `#if 0`
    IfLiteral(bool),
    /// `#else`
    Else,
    /// `#endif`
    Endif,
    /// `= OCTAL`: set origin and pc
    Origin(u32),
    /// `:: OCTAL`: assert pc, then flush
    CheckCurrent(u32),
    /// `: OCTAL`: assert pc-2, then flush
    CheckPrevious(u32),
    /// `b OCTAL`: one byte
    Byte(u32),
    /// One to three bare octal words
    Words(Vec<u32>),
}

impl Line<'_> {
    /// Conditional directives are evaluated even inside suppressed regions,
    /// so nesting depth stays correct.
    pub fn is_conditional(&self) -> bool {
        matches!(
            self,
            Line::Ifdef(_) | Line::IfLiteral(_) | Line::Else | Line::Endif
        )
    }
}

/// Classify one trimmed, non-empty, non-comment line.
///
/// Markers are matched longest first, so `::` can never be taken for `:`
/// followed by a value. Punctuation markers accept their value with or
/// without intervening whitespace; keyword markers are whole tokens.
#[tracing::instrument]
pub fn classify(text: &str) -> Result<Line<'_>, LineError> {
    if let Some(rest) = text.strip_prefix("::") {
        return octal_arg(text, rest).map(Line::CheckCurrent);
    }
    if let Some(rest) = text.strip_prefix(':') {
        return octal_arg(text, rest).map(Line::CheckPrevious);
    }
    if let Some(rest) = text.strip_prefix('=') {
        return octal_arg(text, rest).map(Line::Origin);
    }
    if text.starts_with('#') {
        return classify_directive(text);
    }

    let tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.first() == Some(&"b") {
        if tokens.len() == 2 {
            if let Some(value) = parse_octal(tokens[1]) {
                return Ok(Line::Byte(value));
            }
        }
        return Err(LineError::Syntax(text.to_string()));
    }

    if (1..=3).contains(&tokens.len()) {
        let mut words = Vec::with_capacity(tokens.len());
        for token in &tokens {
            match parse_octal(token) {
                Some(value) => words.push(value),
                None => return Err(LineError::Syntax(text.to_string())),
            }
        }
        return Ok(Line::Words(words));
    }

    Err(LineError::Syntax(text.to_string()))
}

fn classify_directive(text: &str) -> Result<Line<'_>, LineError> {
    let mut tokens = text.split_whitespace();
    let marker = tokens.next().unwrap_or(text);
    match marker {
        "#define" => match (tokens.next(), tokens.next()) {
            (Some(symbol), None) => Ok(Line::Define(symbol)),
            _ => Err(LineError::Syntax(text.to_string())),
        },
        "#ifdef" => match (tokens.next(), tokens.next()) {
            (Some(symbol), None) => Ok(Line::Ifdef(symbol)),
            _ => Err(LineError::Syntax(text.to_string())),
        },
        "#if" => match (tokens.next(), tokens.next()) {
            (Some("1"), None) => Ok(Line::IfLiteral(true)),
            (Some("0"), None) => Ok(Line::IfLiteral(false)),
            _ => Err(LineError::Syntax(text.to_string())),
        },
        "#else" => match tokens.next() {
            None => Ok(Line::Else),
            Some(_) => Err(LineError::Syntax(text.to_string())),
        },
        "#endif" => match tokens.next() {
            None => Ok(Line::Endif),
            Some(_) => Err(LineError::Syntax(text.to_string())),
        },
        "#error" => Ok(Line::UserError(text)),
        "#warning" => Ok(Line::UserWarning(text)),
        _ => Err(LineError::Syntax(text.to_string())),
    }
}

fn octal_arg(text: &str, rest: &str) -> Result<u32, LineError> {
    let mut tokens = rest.split_whitespace();
    match (tokens.next().and_then(parse_octal), tokens.next()) {
        (Some(value), None) => Ok(value),
        _ => Err(LineError::Syntax(text.to_string())),
    }
}

fn parse_octal(token: &str) -> Option<u32> {
    if token.is_empty() || !token.bytes().all(|b| (b'0'..=b'7').contains(&b)) {
        return None;
    }
    u32::from_str_radix(token, 8).ok()
}
