use rlox::scanner::Scanner;
use rlox::token::{Token, TokenType};

fn assert_token_sequence(source: &str, expected: &[(TokenType, &str)]) {
    let scanner = Scanner::new(source);
    let tokens: Vec<Token> = scanner.filter_map(Result::ok).collect();

    assert_eq!(tokens.len(), expected.len());

    for (actual, (expected_type, expected_lexeme)) in tokens.iter().zip(expected.iter()) {
        assert_eq!(actual.token_type, *expected_type);
        assert_eq!(actual.lexeme, *expected_lexeme);
    }
}

#[test]
fn scans_symbols() {
    assert_token_sequence(
        "({*.,+*})",
        &[
            (TokenType::LEFT_PAREN, "("),
            (TokenType::LEFT_BRACE, "{"),
            (TokenType::STAR, "*"),
            (TokenType::DOT, "."),
            (TokenType::COMMA, ","),
            (TokenType::PLUS, "+"),
            (TokenType::STAR, "*"),
            (TokenType::RIGHT_BRACE, "}"),
            (TokenType::RIGHT_PAREN, ")"),
            (TokenType::EOF, ""),
        ],
    );
}

#[test]
fn scans_one_and_two_char_operators() {
    assert_token_sequence(
        "! != = == < <= > >= /",
        &[
            (TokenType::BANG, "!"),
            (TokenType::BANG_EQUAL, "!="),
            (TokenType::EQUAL, "="),
            (TokenType::EQUAL_EQUAL, "=="),
            (TokenType::LESS, "<"),
            (TokenType::LESS_EQUAL, "<="),
            (TokenType::GREATER, ">"),
            (TokenType::GREATER_EQUAL, ">="),
            (TokenType::SLASH, "/"),
            (TokenType::EOF, ""),
        ],
    );
}

#[test]
fn scans_keywords_and_identifiers() {
    assert_token_sequence(
        "var foo = nil; while class_name fun",
        &[
            (TokenType::VAR, "var"),
            (TokenType::IDENTIFIER, "foo"),
            (TokenType::EQUAL, "="),
            (TokenType::NIL, "nil"),
            (TokenType::SEMICOLON, ";"),
            (TokenType::WHILE, "while"),
            (TokenType::IDENTIFIER, "class_name"),
            (TokenType::FUN, "fun"),
            (TokenType::EOF, ""),
        ],
    );
}

#[test]
fn scans_number_literals() {
    let tokens: Vec<Token> = Scanner::new("12 3.5 0.25")
        .filter_map(Result::ok)
        .collect();

    let numbers: Vec<f64> = tokens
        .iter()
        .filter_map(|token| match token.token_type {
            TokenType::NUMBER(n) => Some(n),
            _ => None,
        })
        .collect();

    assert_eq!(numbers, vec![12.0, 3.5, 0.25]);
}

#[test]
fn number_followed_by_dot_is_not_fractional() {
    // "12." scans as NUMBER then DOT; the fractional part needs a digit.
    assert_token_sequence(
        "12.foo",
        &[
            (TokenType::NUMBER(12.0), "12"),
            (TokenType::DOT, "."),
            (TokenType::IDENTIFIER, "foo"),
            (TokenType::EOF, ""),
        ],
    );
}

#[test]
fn scans_string_literals_and_tracks_lines() {
    let tokens: Vec<Token> = Scanner::new("\"one\ntwo\"\nx")
        .filter_map(Result::ok)
        .collect();

    assert_eq!(tokens.len(), 3);
    match &tokens[0].token_type {
        TokenType::STRING(s) => assert_eq!(s, "one\ntwo"),
        other => panic!("expected STRING, got {:?}", other),
    }
    // The string spans lines 1-2, so the identifier after it is on line 3.
    assert_eq!(tokens[1].line, 3);
    assert_eq!(tokens[2].token_type, TokenType::EOF);
}

#[test]
fn unterminated_string_is_an_error() {
    let results: Vec<_> = Scanner::new("\"abc").collect();

    let errors: Vec<String> = results
        .iter()
        .filter_map(|r| r.as_ref().err().map(|e| e.to_string()))
        .collect();

    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("Unterminated string."));
}

#[test]
fn comments_and_whitespace_are_skipped() {
    assert_token_sequence(
        "a // rest of line ignored\nb",
        &[
            (TokenType::IDENTIFIER, "a"),
            (TokenType::IDENTIFIER, "b"),
            (TokenType::EOF, ""),
        ],
    );
}

#[test]
fn unexpected_chars_are_reported_and_scanning_continues() {
    let results: Vec<_> = Scanner::new(",.$(#").collect();

    // COMMA, DOT, error for '$', LEFT_PAREN, error for '#', EOF.
    assert_eq!(results.len(), 6);

    let error_count = results.iter().filter(|r| r.is_err()).count();
    assert_eq!(error_count, 2);

    for err in results.iter().filter_map(|r| r.as_ref().err()) {
        assert!(
            err.to_string().contains("Unexpected character"),
            "unexpected message: {}",
            err
        );
    }

    let kinds: Vec<TokenType> = results
        .iter()
        .filter_map(|r| r.as_ref().ok().map(|t| t.token_type.clone()))
        .collect();
    assert_eq!(
        kinds,
        vec![
            TokenType::COMMA,
            TokenType::DOT,
            TokenType::LEFT_PAREN,
            TokenType::EOF,
        ]
    );
}

#[test]
fn token_stream_ends_with_exactly_one_eof() {
    let tokens: Vec<Token> = Scanner::new("print 1;").filter_map(Result::ok).collect();

    let eof_count = tokens
        .iter()
        .filter(|t| t.token_type == TokenType::EOF)
        .count();

    assert_eq!(eof_count, 1);
    assert_eq!(tokens.last().map(|t| t.token_type.clone()), Some(TokenType::EOF));
}

#[test]
fn eof_carries_final_line_number() {
    let tokens: Vec<Token> = Scanner::new("a\nb\nc").filter_map(Result::ok).collect();

    assert_eq!(tokens.last().map(|t| t.line), Some(3));
}

#[test]
fn scanned_lexemes_reassemble_the_source() {
    let source = "var x = 1 + 2;";
    let lexemes: Vec<String> = Scanner::new(source)
        .filter_map(Result::ok)
        .map(|t| t.lexeme)
        .collect();

    assert_eq!(lexemes.join(" ").trim_end(), "var x = 1 + 2 ;");
}
