//! Span-preserving tokenizer for song sheet markup.
//!
//! The lexer splits HTML-like markup into [`Token`]s without ever failing:
//! anything that does not form a tag, comment or declaration is text, and a
//! `<` that starts nothing valid is emitted as a one-character text token.
//! Every byte of the input belongs to exactly one token, so concatenating the
//! token spans in order reproduces the source.
//!
//! Content of `script` and `style` elements is raw text and comes out as a
//! single [`Token::Text`], even if it contains `<`.

use log::trace;
use winnow::{
    Parser as _,
    ascii::{multispace0, multispace1},
    combinator::{alt, delimited, opt, preceded, repeat, terminated},
    error::{ContextError, ErrMode},
    stream::{LocatingSlice, Location, Stream},
    token::{one_of, rest, take_till, take_until, take_while},
};

use crate::span::Span;

type Input<'a> = LocatingSlice<&'a str>;
type IResult<O> = std::result::Result<O, ErrMode<ContextError>>;

/// Elements whose content is not markup.
const RAW_TEXT_ELEMENTS: [&str; 2] = ["script", "style"];

/// A single `name` or `name=value` pair inside a start tag.
///
/// Values are kept exactly as written, without quotes and without decoding
/// character references.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attribute<'a> {
    pub name: &'a str,
    pub value: Option<&'a str>,
}

/// An opening tag such as `<tr class="ch">`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartTag<'a> {
    pub name: &'a str,
    pub attributes: Vec<Attribute<'a>>,
    pub self_closing: bool,
}

impl<'a> StartTag<'a> {
    /// Returns `true` if this tag has the given name, ignoring ASCII case.
    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    /// Looks up an attribute by name, ignoring ASCII case.
    ///
    /// When an attribute is repeated the first occurrence wins.
    pub fn attribute(&self, name: &str) -> Option<&Attribute<'a>> {
        self.attributes
            .iter()
            .find(|attr| attr.name.eq_ignore_ascii_case(name))
    }

    /// The whitespace-separated entries of the `class` attribute.
    pub fn classes(&self) -> impl Iterator<Item = &'a str> {
        self.attribute("class")
            .and_then(|attr| attr.value)
            .unwrap_or_default()
            .split_whitespace()
    }

    fn is_raw_text(&self) -> bool {
        !self.self_closing && RAW_TEXT_ELEMENTS.iter().any(|name| self.is(name))
    }
}

/// A lexical unit of song markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    /// `<!-- ... -->`, holding the text between the delimiters.
    Comment(&'a str),
    /// `<!DOCTYPE ...>` or `<?...?>`, holding everything after `<!`/`<?`.
    Declaration(&'a str),
    StartTag(StartTag<'a>),
    EndTag { name: &'a str },
    /// Character data, undecoded.
    Text(&'a str),
}

impl Token<'_> {
    /// Returns `true` for a start tag with the given name.
    pub fn is_start(&self, name: &str) -> bool {
        matches!(self, Token::StartTag(tag) if tag.is(name))
    }

    /// Returns `true` for an end tag with the given name.
    pub fn is_end(&self, name: &str) -> bool {
        matches!(self, Token::EndTag { name: tag } if tag.eq_ignore_ascii_case(name))
    }
}

/// A token together with the source bytes it was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionedToken<'a> {
    pub token: Token<'a>,
    pub span: Span,
}

impl<'a> PositionedToken<'a> {
    pub fn new(token: Token<'a>, span: Span) -> Self {
        Self { token, span }
    }
}

/// Parse a comment; an unterminated comment runs to the end of input
fn comment<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    preceded(
        "<!--",
        alt((terminated(take_until(0.., "-->"), "-->"), rest)),
    )
    .map(Token::Comment)
    .parse_next(input)
}

/// Parse `<!...>` and `<?...>` constructs
fn declaration<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    preceded(alt(("<!", "<?")), terminated(take_till(0.., '>'), '>'))
        .map(Token::Declaration)
        .parse_next(input)
}

fn tag_name<'a>(input: &mut Input<'a>) -> IResult<&'a str> {
    (
        one_of(|c: char| c.is_ascii_alphabetic()),
        take_while(0.., |c: char| {
            c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '.')
        }),
    )
        .take()
        .parse_next(input)
}

fn end_tag<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    // Anything between the name and `>` is ignored, as browsers do
    delimited("</", (tag_name, take_till(0.., '>')), '>')
        .map(|(name, _)| Token::EndTag { name })
        .parse_next(input)
}

fn attribute_value<'a>(input: &mut Input<'a>) -> IResult<&'a str> {
    alt((
        delimited('"', take_till(0.., '"'), '"'),
        delimited('\'', take_till(0.., '\''), '\''),
        take_while(1.., |c: char| !c.is_whitespace() && c != '>'),
    ))
    .parse_next(input)
}

fn attribute<'a>(input: &mut Input<'a>) -> IResult<Attribute<'a>> {
    (
        take_while(1.., |c: char| {
            !c.is_whitespace() && !matches!(c, '/' | '>' | '=' | '"' | '\'' | '<')
        }),
        opt(preceded((multispace0, '=', multispace0), attribute_value)),
    )
        .map(|(name, value)| Attribute { name, value })
        .parse_next(input)
}

fn start_tag<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    let name = preceded('<', tag_name).parse_next(input)?;
    let attributes: Vec<Attribute<'a>> =
        repeat(0.., preceded(multispace1, attribute)).parse_next(input)?;
    multispace0.parse_next(input)?;
    let self_closing = opt('/').parse_next(input)?.is_some();
    '>'.parse_next(input)?;

    Ok(Token::StartTag(StartTag {
        name,
        attributes,
        self_closing,
    }))
}

fn text<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    take_till(1.., '<').map(Token::Text).parse_next(input)
}

/// A `<` that does not open any construct
fn stray_angle<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    '<'.take().map(Token::Text).parse_next(input)
}

fn token<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    alt((
        comment,     // Must come before declaration
        declaration, // Must come before start tag
        end_tag,
        start_tag,
        text,
        stray_angle,
    ))
    .parse_next(input)
}

/// Byte offset of the first ASCII case-insensitive occurrence of `needle`.
fn find_ignore_ascii_case(haystack: &str, needle: &str) -> Option<usize> {
    haystack
        .as_bytes()
        .windows(needle.len())
        .position(|window| window.eq_ignore_ascii_case(needle.as_bytes()))
}

/// Consume raw text up to (not including) the closing tag of `element`.
fn raw_text<'a>(input: &mut Input<'a>, element: &str) -> Option<&'a str> {
    let remaining: &'a str = **input;
    let closing = format!("</{element}");
    let len = find_ignore_ascii_case(remaining, &closing).unwrap_or(remaining.len());
    (len > 0).then(|| input.next_slice(len))
}

/// Split song markup into positioned tokens.
///
/// Never fails; see the module documentation for how malformed markup is
/// handled.
pub fn tokenize(source: &str) -> Vec<PositionedToken<'_>> {
    let mut input = LocatingSlice::new(source);
    let mut tokens = Vec::new();

    while !input.is_empty() {
        let start = input.current_token_start();
        let token = match token(&mut input) {
            Ok(token) => token,
            Err(_) => {
                // Unreachable with the stray `<` fallback, but never loop
                input.next_token();
                Token::Text(&source[start..input.current_token_start()])
            }
        };

        let raw_element = match &token {
            Token::StartTag(tag) if tag.is_raw_text() => Some(tag.name),
            _ => None,
        };
        tokens.push(PositionedToken::new(
            token,
            Span::new(start..input.current_token_start()),
        ));

        if let Some(element) = raw_element {
            let raw_start = input.current_token_start();
            if let Some(content) = raw_text(&mut input, element) {
                tokens.push(PositionedToken::new(
                    Token::Text(content),
                    Span::new(raw_start..input.current_token_start()),
                ));
            }
        }
    }

    trace!(bytes = source.len(), tokens = tokens.len(); "Tokenized song markup");
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(input: &str) -> Token<'_> {
        let tokens = tokenize(input);
        assert_eq!(tokens.len(), 1, "expected one token for {input:?}: {tokens:?}");
        tokens.into_iter().next().unwrap().token
    }

    #[test]
    fn test_text() {
        assert_eq!(single("Friday night"), Token::Text("Friday night"));
        assert_eq!(single("G&nbsp;"), Token::Text("G&nbsp;"));
    }

    #[test]
    fn test_comment() {
        assert_eq!(single("<!-- verse 1 -->"), Token::Comment(" verse 1 "));
        assert_eq!(single("<!-- unterminated"), Token::Comment(" unterminated"));
    }

    #[test]
    fn test_declaration() {
        assert_eq!(single("<!DOCTYPE html>"), Token::Declaration("DOCTYPE html"));
        assert_eq!(
            single("<?xml version=\"1.0\"?>"),
            Token::Declaration("xml version=\"1.0\"?")
        );
    }

    #[test]
    fn test_start_tag_attributes() {
        let Token::StartTag(tag) = single(r#"<td class="a b" data-x='1' nowrap width=40>"#) else {
            panic!("expected start tag");
        };
        assert_eq!(tag.name, "td");
        assert!(!tag.self_closing);
        assert_eq!(
            tag.attributes,
            vec![
                Attribute {
                    name: "class",
                    value: Some("a b")
                },
                Attribute {
                    name: "data-x",
                    value: Some("1")
                },
                Attribute {
                    name: "nowrap",
                    value: None
                },
                Attribute {
                    name: "width",
                    value: Some("40")
                },
            ]
        );
        assert_eq!(tag.classes().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_unquoted_class() {
        let Token::StartTag(tag) = single("<TR CLASS=ch>") else {
            panic!("expected start tag");
        };
        assert!(tag.is("tr"));
        assert_eq!(tag.classes().collect::<Vec<_>>(), vec!["ch"]);
    }

    #[test]
    fn test_quoted_value_may_contain_angle() {
        let Token::StartTag(tag) = single(r#"<img alt="a > b">"#) else {
            panic!("expected start tag");
        };
        assert_eq!(tag.attribute("ALT").and_then(|a| a.value), Some("a > b"));
    }

    #[test]
    fn test_self_closing() {
        let Token::StartTag(tag) = single("<br/>") else {
            panic!("expected start tag");
        };
        assert!(tag.self_closing);
        assert!(single("<br />").is_start("BR"));
    }

    #[test]
    fn test_end_tag() {
        assert_eq!(single("</tr>"), Token::EndTag { name: "tr" });
        assert!(single("</TD >").is_end("td"));
    }

    #[test]
    fn test_stray_angle_is_text() {
        let tokens = tokenize("a < b");
        let kinds: Vec<_> = tokens.iter().map(|t| &t.token).collect();
        assert_eq!(
            kinds,
            vec![&Token::Text("a "), &Token::Text("<"), &Token::Text(" b")]
        );
    }

    #[test]
    fn test_unterminated_tag_is_text() {
        let tokens = tokenize("<td class=\"x");
        assert_eq!(tokens[0].token, Token::Text("<"));
        assert!(tokens.iter().all(|t| matches!(t.token, Token::Text(_))));
    }

    #[test]
    fn test_script_content_is_raw() {
        let source = "<script>if (a<b) { x = '<td>'; }</SCRIPT><td>";
        let tokens = tokenize(source);
        assert_eq!(tokens.len(), 4);
        assert!(tokens[0].token.is_start("script"));
        assert_eq!(tokens[1].token, Token::Text("if (a<b) { x = '<td>'; }"));
        assert!(tokens[2].token.is_end("script"));
        assert!(tokens[3].token.is_start("td"));
    }

    #[test]
    fn test_empty_and_unclosed_style() {
        let tokens = tokenize("<style></style>");
        assert_eq!(tokens.len(), 2);

        let tokens = tokenize("<style>td { color: red }");
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[1].token, Token::Text("td { color: red }"));
    }

    #[test]
    fn test_spans_cover_source() {
        let source = "<tr class=ch><td>G&nbsp;</td><td>C/G</td></tr>\n";
        let tokens = tokenize(source);
        assert_eq!(tokens[0].span, Span::new(0..13));
        let rebuilt: String = tokens.iter().map(|t| t.span.text(source)).collect();
        assert_eq!(rebuilt, source);
    }
}
