use crate::config::check_num;
use anyhow::{Context, Result, bail};
use std::{
    collections::VecDeque,
    io::{BufRead, Write},
};

/// Whitespace-separated tokens read line by line on demand.
struct Tokens<R> {
    reader: R,
    buf: VecDeque<String>,
}

impl<R: BufRead> Tokens<R> {
    fn new(reader: R) -> Self {
        Self {
            reader,
            buf: VecDeque::new(),
        }
    }

    fn next_token(&mut self) -> Result<String> {
        while self.buf.is_empty() {
            let mut line = String::new();
            let n_bytes = self
                .reader
                .read_line(&mut line)
                .context("failed to read line")?;
            if n_bytes == 0 {
                bail!("unexpected end of input");
            }
            self.buf.extend(line.split_whitespace().map(str::to_string));
        }
        self.buf.pop_front().context("token buffer is empty")
    }
}

/// Prompt for a sequence length, then for that many values.
pub fn prompt_seq<R: BufRead, W: Write>(
    reader: R,
    writer: &mut W,
    max_len: usize,
) -> Result<Vec<f64>> {
    let mut tokens = Tokens::new(reader);

    write!(writer, "Enter array size: ").context("failed to write prompt")?;
    writer.flush().context("failed to flush prompt")?;
    let len = parse_len(&tokens.next_token()?, max_len).context("invalid array size")?;

    write!(writer, "Enter {len} elements: ").context("failed to write prompt")?;
    writer.flush().context("failed to flush prompt")?;
    let mut vals = Vec::with_capacity(len);
    for i_val in 0..len {
        let token = tokens
            .next_token()
            .with_context(|| format!("failed to read element {i_val}"))?;
        let val = parse_val(&token).with_context(|| format!("invalid element {i_val}"))?;
        vals.push(val);
    }

    Ok(vals)
}

pub fn parse_len(token: &str, max_len: usize) -> Result<usize> {
    let len: usize = token
        .parse()
        .with_context(|| format!("{token:?} is not a non-negative integer"))?;
    check_num(len, 0..=max_len)?;
    Ok(len)
}

pub fn parse_val(token: &str) -> Result<f64> {
    let val: f64 = token
        .parse()
        .with_context(|| format!("{token:?} is not a number"))?;
    check_finite(val)?;
    Ok(val)
}

pub fn check_finite(val: f64) -> Result<()> {
    if !val.is_finite() {
        bail!("number must be finite, but is {val}");
    }
    Ok(())
}

