use crate::operation::GraphOperationKind;

/// An `ADD`, `COPY` or `MOVE` clause of an update text.
///
/// The parser rewrites these clauses into `DROP` and pattern-driven operations and loses the
/// `SILENT` flag of `ADD` and `COPY` on the way. The clauses are recovered from the text to restore
/// the original operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct TransferClause {
    pub kind: GraphOperationKind,
    pub silent: bool,
}

/// Scans `update` for its transfer clauses, in the order they appear.
///
/// Clauses whose source and destination are spelled the same are skipped, as the parser drops
/// them entirely.
pub(crate) fn transfer_clauses(update: &str) -> Vec<TransferClause> {
    let tokens = tokenize(update);
    let mut clauses = Vec::new();
    let mut rest = tokens.as_slice();
    while let Some((token, tail)) = rest.split_first() {
        rest = tail;
        let Some(kind) = transfer_kind(*token) else {
            continue;
        };
        let silent = matches!(
            tail.first(),
            Some(Token::Word(word)) if word.eq_ignore_ascii_case("SILENT")
        );
        let tail = if silent { &tail[1..] } else { tail };
        let Some((from, tail)) = graph_or_default(tail) else {
            continue;
        };
        let [Token::Word(to_keyword), tail @ ..] = tail else {
            continue;
        };
        if !to_keyword.eq_ignore_ascii_case("TO") {
            continue;
        }
        let Some((to, tail)) = graph_or_default(tail) else {
            continue;
        };
        rest = tail;
        if from != to {
            clauses.push(TransferClause { kind, silent });
        }
    }
    clauses
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Token<'a> {
    Word(&'a str),
    Iri(&'a str),
    Other,
}

fn transfer_kind(token: Token<'_>) -> Option<GraphOperationKind> {
    let Token::Word(word) = token else {
        return None;
    };
    [
        GraphOperationKind::Add,
        GraphOperationKind::Copy,
        GraphOperationKind::Move,
    ]
    .into_iter()
    .find(|kind| word.eq_ignore_ascii_case(kind.as_str()))
}

fn graph_or_default<'t, 'a>(tokens: &'t [Token<'a>]) -> Option<(Token<'a>, &'t [Token<'a>])> {
    match tokens {
        [Token::Word(word), rest @ ..] if word.eq_ignore_ascii_case("DEFAULT") => {
            Some((Token::Word("DEFAULT"), rest))
        }
        [Token::Word(word), graph, rest @ ..] if word.eq_ignore_ascii_case("GRAPH") => {
            Some((*graph, rest))
        }
        [graph @ (Token::Word(_) | Token::Iri(_)), rest @ ..] => Some((*graph, rest)),
        _ => None,
    }
}

/// Splits `text` into the tokens relevant for finding transfer clauses. Comments and string
/// literals are skipped so that their content is never mistaken for a keyword.
fn tokenize(text: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut rest = text;
    while let Some(c) = rest.chars().next() {
        let len = if c.is_whitespace() {
            c.len_utf8()
        } else if c == '#' {
            rest.find(['\n', '\r']).unwrap_or(rest.len())
        } else if c == '"' || c == '\'' {
            tokens.push(Token::Other);
            string_len(rest, c)
        } else if let Some(len) = iri_len(rest) {
            tokens.push(Token::Iri(&rest[..len]));
            len
        } else if is_word_char(c) {
            let len = rest.find(|c| !is_word_char(c)).unwrap_or(rest.len());
            tokens.push(Token::Word(&rest[..len]));
            len
        } else {
            tokens.push(Token::Other);
            c.len_utf8()
        };
        rest = &rest[len..];
    }
    tokens
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | ':' | '-' | '.' | '?' | '$' | '%')
}

/// The length of the IRI reference at the start of `text`, if there is one.
fn iri_len(text: &str) -> Option<usize> {
    if !text.starts_with('<') {
        return None;
    }
    for (i, c) in text.char_indices().skip(1) {
        match c {
            '>' => return Some(i + 1),
            '<' | '"' | '{' | '}' | '|' | '^' | '`' | '\\' => return None,
            c if c <= ' ' => return None,
            _ => {}
        }
    }
    None
}

/// The length of the string literal at the start of `text`, quotes included.
fn string_len(text: &str, quote: char) -> usize {
    let delimiter = if quote == '"' { b"\"\"\"" } else { b"'''" };
    let long = text.as_bytes().starts_with(delimiter);
    let open = if long { 3 } else { 1 };
    let mut chars = text.char_indices().skip(open);
    while let Some((i, c)) = chars.next() {
        if c == '\\' {
            chars.next();
        } else if long && text.as_bytes()[i..].starts_with(delimiter) {
            return i + 3;
        } else if !long && c == quote {
            return i + 1;
        }
    }
    text.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clauses(update: &str) -> Vec<(&'static str, bool)> {
        transfer_clauses(update)
            .into_iter()
            .map(|clause| (clause.kind.as_str(), clause.silent))
            .collect()
    }

    #[test]
    fn finds_clauses_in_order() {
        let update = "ADD <http://e.com/a> TO DEFAULT ; copy silent graph <http://e.com/a> TO ex:b ;\
                      MOVE SILENT DEFAULT TO <http://e.com/b>";
        assert_eq!(
            clauses(update),
            vec![("add", false), ("copy", true), ("move", true)]
        );
    }

    #[test]
    fn skips_identity_clauses() {
        assert!(clauses("COPY <http://e.com/a> TO GRAPH <http://e.com/a>").is_empty());
        assert!(clauses("MOVE DEFAULT TO default").is_empty());
    }

    #[test]
    fn ignores_keywords_in_strings_iris_and_comments() {
        let update = r#"# COPY <a> TO <b>
            INSERT DATA { <http://e.com/ADD> <http://e.com/p> "MOVE <a> TO <b>", '''COPY
            <a> TO <b>''' , ex:add }"#;
        assert!(clauses(update).is_empty());
    }

    #[test]
    fn less_than_is_not_an_iri() {
        let update = "DELETE { ?s ?p ?o } WHERE { ?s ?p ?o FILTER(?o < 3) } ; \
                      ADD SILENT <http://e.com/a> TO <http://e.com/b>";
        assert_eq!(clauses(update), vec![("add", true)]);
    }
}
