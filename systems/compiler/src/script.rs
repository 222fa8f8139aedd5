//! Compact text notation for block programs.
//!
//! ```text
//! start
//! repeat 3 { move; turn_right }   # comments run to the end of the line
//! collect
//! ```

use codecraft_core::Command;

use crate::{
    compile_program, fail_soft, Block, CommandSource, CompileError, Program, MAX_DEPTH,
};

/// Program written in the text notation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Script(pub String);

impl Script {
    /// Parses the script into its block tree.
    pub fn parse(&self) -> Result<Program, CompileError> {
        let tokens = tokenize(&self.0);
        let mut parser = Parser {
            tokens: &tokens,
            index: 0,
            depth: 0,
        };
        let blocks = parser.blocks(None)?;
        Ok(Program::new(blocks))
    }
}

impl CommandSource for Script {
    fn commands(&self) -> Vec<Command> {
        fail_soft(self.parse().and_then(|program| compile_program(&program)))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TokenKind<'a> {
    Word(&'a str),
    Open,
    Close,
}

#[derive(Clone, Copy, Debug)]
struct Token<'a> {
    kind: TokenKind<'a>,
    offset: usize,
}

fn tokenize(source: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut chars = source.char_indices().peekable();

    while let Some((offset, ch)) = chars.next() {
        match ch {
            '#' => {
                while chars.next_if(|(_, ch)| *ch != '\n').is_some() {}
            }
            '{' => tokens.push(Token {
                kind: TokenKind::Open,
                offset,
            }),
            '}' => tokens.push(Token {
                kind: TokenKind::Close,
                offset,
            }),
            ch if ch.is_whitespace() || ch == ';' || ch == ',' => {}
            _ => {
                let mut end = offset + ch.len_utf8();
                while let Some((next, ch)) =
                    chars.next_if(|(_, ch)| !is_delimiter(*ch))
                {
                    end = next + ch.len_utf8();
                }
                tokens.push(Token {
                    kind: TokenKind::Word(&source[offset..end]),
                    offset,
                });
            }
        }
    }

    tokens
}

fn is_delimiter(ch: char) -> bool {
    ch.is_whitespace() || matches!(ch, ';' | ',' | '{' | '}' | '#')
}

struct Parser<'t, 'a> {
    tokens: &'t [Token<'a>],
    index: usize,
    depth: usize,
}

impl<'t, 'a> Parser<'t, 'a> {
    fn next(&mut self) -> Option<Token<'a>> {
        let token = self.tokens.get(self.index).copied()?;
        self.index += 1;
        Some(token)
    }

    /// Parses blocks until the end of input or, inside a repeat, its closing brace.
    fn blocks(&mut self, opened_at: Option<usize>) -> Result<Vec<Block>, CompileError> {
        let mut blocks = Vec::new();
        loop {
            let Some(token) = self.next() else {
                return match opened_at {
                    Some(offset) => Err(CompileError::UnclosedRepeat { offset }),
                    None => Ok(blocks),
                };
            };

            let word = match token.kind {
                TokenKind::Close if opened_at.is_some() => return Ok(blocks),
                TokenKind::Close => {
                    return Err(CompileError::UnmatchedBrace {
                        offset: token.offset,
                    })
                }
                TokenKind::Open => {
                    return Err(CompileError::UnexpectedToken {
                        token: "{".to_owned(),
                        offset: token.offset,
                    })
                }
                TokenKind::Word(word) => word,
            };

            let block = match word.to_ascii_lowercase().as_str() {
                "start" => Block::Start,
                "move" | "forward" => Block::Move,
                "left" | "turn_left" => Block::TurnLeft,
                "right" | "turn_right" => Block::TurnRight,
                "collect" | "refuel" => Block::Collect,
                "repeat" => self.repeat(token.offset)?,
                _ => {
                    return Err(CompileError::UnexpectedToken {
                        token: word.to_owned(),
                        offset: token.offset,
                    })
                }
            };
            blocks.push(block);
        }
    }

    fn repeat(&mut self, offset: usize) -> Result<Block, CompileError> {
        let times = match self.next() {
            Some(Token {
                kind: TokenKind::Word(word),
                ..
            }) => word
                .parse::<u32>()
                .map_err(|_| CompileError::MissingRepeatCount { offset })?,
            _ => return Err(CompileError::MissingRepeatCount { offset }),
        };

        let open = match self.next() {
            Some(Token {
                kind: TokenKind::Open,
                offset,
            }) => offset,
            _ => return Err(CompileError::MissingRepeatBody { offset }),
        };

        if self.depth == MAX_DEPTH {
            return Err(CompileError::NestingTooDeep {
                offset,
                limit: MAX_DEPTH,
            });
        }
        self.depth += 1;
        let body = self.blocks(Some(open))?;
        self.depth -= 1;
        Ok(Block::Repeat { times, body })
    }
}

#[cfg(test)]
mod tests {
    use super::{tokenize, TokenKind};

    #[test]
    fn tokenizer_splits_on_braces_and_separators() {
        let kinds: Vec<_> = tokenize("repeat 2{move;left} # trailing")
            .into_iter()
            .map(|token| token.kind)
            .collect();

        assert_eq!(
            kinds,
            vec![
                TokenKind::Word("repeat"),
                TokenKind::Word("2"),
                TokenKind::Open,
                TokenKind::Word("move"),
                TokenKind::Word("left"),
                TokenKind::Close,
            ]
        );
    }
}
