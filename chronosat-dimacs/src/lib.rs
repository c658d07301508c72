//! DIMACS CNF parser and writer for the chronosat SAT solver.

use std::{borrow::Borrow, io, mem::replace};

use chronosat_formula::{CnfFormula, Lit, Var};

use anyhow::Error;
use thiserror::Error;

/// Possible errors while parsing a DIMACS CNF formula.
#[derive(Debug, Error)]
pub enum ParserError {
    #[error("line {line}: unexpected character in DIMACS CNF input: '{unexpected}'")]
    UnexpectedInput { line: usize, unexpected: char },
    #[error("line {line}: literal exceeds the supported variable range")]
    LiteralOutOfRange { line: usize },
    #[error("line {line}: invalid header syntax: {header}")]
    InvalidHeader { line: usize, header: String },
    #[error("line {line}: unterminated clause")]
    UnterminatedClause { line: usize },
    #[error("formula has {var_count} variables while the header specifies {header_var_count}")]
    VarCount {
        var_count: usize,
        header_var_count: usize,
    },
    #[error("formula has {clause_count} clauses while the header specifies {header_clause_count}")]
    ClauseCount {
        clause_count: usize,
        header_clause_count: usize,
    },
    #[error("parser invoked after a previous error")]
    PreviousError,
}

/// Variable and clause count of a DIMACS CNF header.
#[derive(Copy, Clone, Debug)]
pub struct DimacsHeader {
    pub var_count: usize,
    pub clause_count: usize,
}

/// What the next input byte is part of.
#[derive(Copy, Clone, Eq, PartialEq)]
enum Mode {
    /// Literals and whitespace.
    Formula,
    /// A comment line, skipped up to the line end.
    Comment,
    /// The header line, collected up to the line end.
    Header,
}

/// Parser for DIMACS CNF files.
///
/// Consumes the input in chunks and can hand out the parsed clauses in chunks as well, so
/// arbitrarily large files can be parsed with bounded extra memory.
pub struct DimacsParser {
    formula: CnfFormula,
    partial_clause: Vec<Lit>,
    header: Option<DimacsHeader>,
    header_line: Vec<u8>,

    mode: Mode,
    line_number: usize,
    clause_count: usize,

    partial_lit: usize,
    negate_lit: bool,
    in_lit: bool,
    start_of_line: bool,
    poisoned: bool,
}

impl Default for DimacsParser {
    fn default() -> DimacsParser {
        DimacsParser::new()
    }
}

impl DimacsParser {
    /// Create a new DIMACS CNF parser.
    pub fn new() -> DimacsParser {
        DimacsParser {
            formula: CnfFormula::new(),
            partial_clause: vec![],
            header: None,
            header_line: vec![],

            mode: Mode::Formula,
            line_number: 1,
            clause_count: 0,

            partial_lit: 0,
            negate_lit: false,
            in_lit: false,
            start_of_line: true,
            poisoned: false,
        }
    }

    /// Parse the given input into a single formula and check the header if present.
    ///
    /// For incremental processing use [`parse_incremental`](DimacsParser::parse_incremental) or
    /// drive [`parse_chunk`](DimacsParser::parse_chunk) directly.
    pub fn parse(input: impl io::Read) -> Result<CnfFormula, Error> {
        Ok(Self::parse_incremental(input, |_| Ok(()))?.take_formula())
    }

    /// Parse the given input incrementally and check the header if present.
    ///
    /// The callback is invoked after each chunk with a reference to the parser. It can consume
    /// the clauses parsed so far by calling [`take_formula`](DimacsParser::take_formula) on the
    /// passed argument.
    pub fn parse_incremental(
        input: impl io::Read,
        mut callback: impl FnMut(&mut DimacsParser) -> Result<(), Error>,
    ) -> Result<DimacsParser, Error> {
        use io::BufRead;

        let mut buffer = io::BufReader::new(input);
        let mut parser = Self::new();

        loop {
            let data = buffer.fill_buf()?;
            if data.is_empty() {
                break;
            }
            parser.parse_chunk(data)?;
            let len = data.len();
            buffer.consume(len);

            callback(&mut parser)?;
        }
        parser.eof()?;
        callback(&mut parser)?;
        parser.check_header()?;

        Ok(parser)
    }

    /// Parse a chunk of input.
    ///
    /// After the last chunk call [`eof`](DimacsParser::eof). When this method returns an error
    /// the parser cannot be used for further chunks.
    pub fn parse_chunk(&mut self, chunk: &[u8]) -> Result<(), ParserError> {
        if self.poisoned {
            return Err(ParserError::PreviousError);
        }
        for &byte in chunk.iter() {
            if byte == b'\n' {
                self.line_number += 1;
            }
            match self.mode {
                Mode::Comment => {
                    if byte == b'\n' || byte == b'\r' {
                        self.mode = Mode::Formula;
                        self.start_of_line = true;
                    }
                }
                Mode::Header => {
                    if byte == b'\n' || byte == b'\r' {
                        self.parse_header_line()?;
                        self.mode = Mode::Formula;
                        self.start_of_line = true;
                    } else {
                        self.header_line.push(byte);
                    }
                }
                Mode::Formula => self.formula_byte(byte)?,
            }
        }

        Ok(())
    }

    fn formula_byte(&mut self, byte: u8) -> Result<(), ParserError> {
        match byte {
            b'0'..=b'9' => {
                let digit = (byte - b'0') as usize;

                // The next literal number would be partial_lit * 10 + digit; reject it before
                // multiplying so the accumulator stays within Var::max_count().
                if self.partial_lit > (Var::max_count() - digit) / 10 {
                    self.poisoned = true;
                    return Err(ParserError::LiteralOutOfRange {
                        line: self.line_number,
                    });
                }

                self.partial_lit = self.partial_lit * 10 + digit;
                self.in_lit = true;
                self.start_of_line = false;
            }
            b'-' if !self.negate_lit && !self.in_lit => {
                self.negate_lit = true;
                self.start_of_line = false;
            }
            b' ' | b'\n' | b'\r' if self.in_lit || !self.negate_lit => {
                self.finish_literal();
                self.negate_lit = false;
                self.in_lit = false;
                self.partial_lit = 0;
                self.start_of_line = byte != b' ';
            }
            b'c' if self.start_of_line => {
                self.mode = Mode::Comment;
            }
            b'p' if self.start_of_line && self.header.is_none() => {
                self.mode = Mode::Header;
                self.header_line.push(b'p');
            }
            _ => {
                self.poisoned = true;
                return Err(ParserError::UnexpectedInput {
                    line: self.line_number,
                    unexpected: byte as char,
                });
            }
        }
        Ok(())
    }

    /// Finish parsing the input.
    ///
    /// This does not verify the header counts, call [`check_header`](DimacsParser::check_header)
    /// for that.
    pub fn eof(&mut self) -> Result<(), ParserError> {
        if self.mode == Mode::Header {
            self.parse_header_line()?;
        }

        self.finish_literal();

        if !self.partial_clause.is_empty() {
            return Err(ParserError::UnterminatedClause {
                line: self.line_number,
            });
        }

        Ok(())
    }

    /// Verify the header information when present.
    ///
    /// Does nothing when the input has no header.
    pub fn check_header(&self) -> Result<(), ParserError> {
        if let Some(header) = self.header {
            let var_count = self.formula.var_count();
            if var_count != header.var_count {
                return Err(ParserError::VarCount {
                    var_count,
                    header_var_count: header.var_count,
                });
            }

            if self.clause_count != header.clause_count {
                return Err(ParserError::ClauseCount {
                    clause_count: self.clause_count,
                    header_clause_count: header.clause_count,
                });
            }
        }

        Ok(())
    }

    /// Returns the subformula of everything parsed since the last call of this method.
    ///
    /// For whole-file parsing simply call this once after [`eof`](DimacsParser::eof). The
    /// variable count of the returned formula is the maximum of the variable count so far and
    /// the header's variable count if a header was present.
    pub fn take_formula(&mut self) -> CnfFormula {
        let mut fresh = CnfFormula::new();
        fresh.set_var_count(self.formula.var_count());
        replace(&mut self.formula, fresh)
    }

    /// The DIMACS CNF header if one was parsed.
    pub fn header(&self) -> Option<DimacsHeader> {
        self.header
    }

    /// Number of clauses parsed so far.
    pub fn clause_count(&self) -> usize {
        self.clause_count
    }

    /// Number of variables in the formula parsed so far.
    pub fn var_count(&self) -> usize {
        self.formula.var_count()
    }

    fn finish_literal(&mut self) {
        if self.in_lit {
            if self.partial_lit == 0 {
                self.formula.add_clause(&self.partial_clause);
                self.partial_clause.clear();
                self.clause_count += 1;
            } else {
                self.partial_clause
                    .push(Var::from_dimacs(self.partial_lit as isize).lit(!self.negate_lit));
            }
        }
    }

    fn parse_header_line(&mut self) -> Result<(), ParserError> {
        let header_line = String::from_utf8_lossy(&self.header_line).into_owned();

        let mut fields = header_line.split_whitespace();

        if fields.next() != Some("p") || fields.next() != Some("cnf") {
            return self.invalid_header(header_line);
        }

        let var_count: usize = match fields.next().and_then(|value| str::parse(value).ok()) {
            None => return self.invalid_header(header_line),
            Some(value) => value,
        };

        if var_count > Var::max_count() {
            self.poisoned = true;
            return Err(ParserError::LiteralOutOfRange {
                line: self.line_number,
            });
        }

        let clause_count: usize = match fields.next().and_then(|value| str::parse(value).ok()) {
            None => return self.invalid_header(header_line),
            Some(value) => value,
        };

        if fields.next().is_some() {
            return self.invalid_header(header_line);
        }

        self.header = Some(DimacsHeader {
            var_count,
            clause_count,
        });

        self.formula.set_var_count(var_count);

        Ok(())
    }

    fn invalid_header(&mut self, header_line: String) -> Result<(), ParserError> {
        self.poisoned = true;
        Err(ParserError::InvalidHeader {
            line: self.line_number,
            header: header_line,
        })
    }
}

/// Write a DIMACS CNF header.
///
/// Can be combined with [`write_dimacs_clauses`] for incremental writing.
pub fn write_dimacs_header(target: &mut impl io::Write, header: DimacsHeader) -> io::Result<()> {
    writeln!(
        target,
        "p cnf {var_count} {clause_count}",
        var_count = header.var_count,
        clause_count = header.clause_count
    )
}

/// Write an iterator of clauses as headerless DIMACS CNF.
///
/// Can be combined with [`write_dimacs_header`] for incremental writing.
pub fn write_dimacs_clauses(
    target: &mut impl io::Write,
    clauses: impl IntoIterator<Item = impl IntoIterator<Item = impl Borrow<Lit>>>,
) -> io::Result<()> {
    for clause in clauses.into_iter() {
        for lit in clause.into_iter() {
            itoa::write(&mut *target, lit.borrow().to_dimacs())?;
            target.write_all(b" ")?;
        }
        target.write_all(b"0\n")?;
    }
    Ok(())
}

/// Write a formula as DIMACS CNF.
pub fn write_dimacs(target: &mut impl io::Write, formula: &CnfFormula) -> io::Result<()> {
    write_dimacs_header(
        &mut *target,
        DimacsHeader {
            var_count: formula.var_count(),
            clause_count: formula.len(),
        },
    )?;
    write_dimacs_clauses(&mut *target, formula.iter())
}
