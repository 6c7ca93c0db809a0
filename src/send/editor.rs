//! Interactive maximum-fee editor.
//!
//! The editor is an explicit state value: every [`Key`] consumes the current
//! [`FeeNegotiation`] and yields the next one plus a [`Transition`], and
//! [`FeeNegotiation::view`] describes what to draw. [`run_fee_editor`] drives
//! it from a [`Console`] until the user commits or aborts.

use std::fmt;

use crate::blockchain::amount::{format_fil, format_nano, parse_fil, TokenAmount};
use crate::send::console::Console;
use crate::send::error::{SendError, SendResult};
use crate::send::fee;

/// One input event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    /// A printable key; `s`, `S`, `+` and `-` are commands.
    Char(char),
    Backspace,
    /// Replace the whole field content.
    Replace(String),
    Enter,
    Abort,
}

/// What the driver should do after a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Continue,
    Committed,
    Aborted,
}

/// Standing of the candidate fee against the thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeeStatus {
    /// Field text does not parse.
    Invalid,
    /// Below the required fee.
    TooLow,
    /// At least required but below safe; carries candidate/required in percent.
    Low { percent_of_minimum: u64 },
    Safe,
}

impl fmt::Display for FeeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invalid => f.write_str("invalid price"),
            Self::TooLow => f.write_str("too low"),
            Self::Low { percent_of_minimum } => write!(
                f,
                "low {:.1}x over the minimum",
                *percent_of_minimum as f64 / 100.0
            ),
            Self::Safe => f.write_str("SAFE"),
        }
    }
}

/// State of one fee negotiation.
#[derive(Debug, Clone)]
pub struct FeeNegotiation {
    base_fee: TokenAmount,
    gas_limit: u64,
    required: TokenAmount,
    safe: TokenAmount,
    configured_max_fee: TokenAmount,
    candidate_max_fee: TokenAmount,
    raw_input: String,
    input_valid: bool,
    committed: bool,
}

impl FeeNegotiation {
    /// Start from the message's current fee cap.
    pub fn new(base_fee: TokenAmount, gas_limit: u64, fee_cap: &TokenAmount) -> Self {
        let required = fee::required(&base_fee, gas_limit);
        let safe = fee::safe(&required);
        let max_fee = fee_cap * gas_limit;

        Self {
            base_fee,
            gas_limit,
            required,
            safe,
            configured_max_fee: max_fee.clone(),
            raw_input: format_fil(&max_fee),
            candidate_max_fee: max_fee,
            input_valid: true,
            committed: false,
        }
    }

    /// Apply one key.
    pub fn update(mut self, key: Key) -> (Self, Transition) {
        match key {
            Key::Enter => {
                // Commits whatever the last valid fee is, even below required.
                self.committed = true;
                return (self, Transition::Committed);
            }
            Key::Abort => return (self, Transition::Aborted),
            Key::Char('s') | Key::Char('S') => {
                let safe = self.safe.clone();
                self.set_fee(safe);
            }
            Key::Char('+') => {
                if self.input_valid {
                    self.set_fee(fee::increase(&self.candidate_max_fee));
                }
            }
            Key::Char('-') => {
                if self.input_valid {
                    self.set_fee(fee::decrease(&self.candidate_max_fee));
                }
            }
            Key::Char(c) if !c.is_control() => {
                self.raw_input.push(c);
                self.reparse();
            }
            Key::Char(_) => {}
            Key::Backspace => {
                self.raw_input.pop();
                self.reparse();
            }
            Key::Replace(text) => {
                self.raw_input = text;
                self.reparse();
            }
        }
        (self, Transition::Continue)
    }

    fn set_fee(&mut self, max_fee: TokenAmount) {
        self.raw_input = format_fil(&max_fee);
        self.candidate_max_fee = max_fee;
        self.input_valid = true;
    }

    // Unparseable text keeps the last valid candidate.
    fn reparse(&mut self) {
        match parse_fil(&self.raw_input) {
            Ok(max_fee) => {
                self.candidate_max_fee = max_fee;
                self.input_valid = true;
            }
            Err(_) => self.input_valid = false,
        }
    }

    pub fn status(&self) -> FeeStatus {
        if !self.input_valid {
            FeeStatus::Invalid
        } else if self.candidate_max_fee >= self.safe {
            FeeStatus::Safe
        } else if self.candidate_max_fee >= self.required {
            let percent = &self.candidate_max_fee * 100u32 / &self.required;
            FeeStatus::Low {
                percent_of_minimum: u64::try_from(&percent).unwrap_or(u64::MAX),
            }
        } else {
            FeeStatus::TooLow
        }
    }

    /// Fee cap implied by the candidate, rounded down.
    pub fn fee_cap(&self) -> TokenAmount {
        if self.gas_limit == 0 {
            return self.candidate_max_fee.clone();
        }
        &self.candidate_max_fee / self.gas_limit
    }

    pub fn candidate_max_fee(&self) -> &TokenAmount {
        &self.candidate_max_fee
    }

    pub fn raw_input(&self) -> &str {
        &self.raw_input
    }

    pub fn required(&self) -> &TokenAmount {
        &self.required
    }

    pub fn safe(&self) -> &TokenAmount {
        &self.safe
    }

    pub fn committed(&self) -> bool {
        self.committed
    }

    /// Render description of the current state.
    pub fn view(&self) -> FeeView {
        FeeView {
            configured_max_fee: format_fil(&self.configured_max_fee),
            required: format_fil(&self.required),
            safe: format_fil(&self.safe),
            input: self.raw_input.clone(),
            status: self.status(),
            base_fee: format_nano(&self.base_fee),
            resulting_fee_cap: format_nano(&self.fee_cap()),
        }
    }
}

/// Everything the editor screen shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeeView {
    pub configured_max_fee: String,
    pub required: String,
    pub safe: String,
    pub input: String,
    pub status: FeeStatus,
    pub base_fee: String,
    pub resulting_fee_cap: String,
}

impl fmt::Display for FeeView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Fee of the message is too low.")?;
        writeln!(f, "Your configured maximum fee is: {} FIL", self.configured_max_fee)?;
        writeln!(f, "Required maximum fee for the message: {} FIL", self.required)?;
        writeln!(f, "Safe maximum fee for the message: {} FIL   Press S to use it", self.safe)?;
        writeln!(f, "Current Maximum Fee: {} FIL {}", self.input, self.status)?;
        writeln!(f)?;
        writeln!(f, "Current Base Fee is: {}", self.base_fee)?;
        writeln!(f, "Resulting FeeCap is: {}", self.resulting_fee_cap)?;
        write!(
            f,
            "Type a new fee, '+' or '-' to adjust it, Enter to accept, 'q' to abort."
        )
    }
}

/// Translate one input line into editor keys.
///
/// An empty line is Enter, `q`/`quit`/`abort` abort, a line made only of
/// command keys sends them in order, anything else replaces the field.
pub fn keys_from_line(line: &str) -> Vec<Key> {
    let line = line.trim();
    if line.is_empty() {
        return vec![Key::Enter];
    }
    if ["q", "quit", "abort"].iter().any(|w| line.eq_ignore_ascii_case(w)) {
        return vec![Key::Abort];
    }
    if line.chars().all(|c| matches!(c, 's' | 'S' | '+' | '-')) {
        return line.chars().map(Key::Char).collect();
    }
    vec![Key::Replace(line.to_string())]
}

/// Run the editor until commit or abort.
///
/// End of input is treated as an abort.
pub fn run_fee_editor<C: Console>(
    console: &mut C,
    mut state: FeeNegotiation,
) -> SendResult<FeeNegotiation> {
    loop {
        console.print(&state.view().to_string())?;
        console.prompt("> ")?;

        let Some(line) = console.read_line()? else {
            return Err(SendError::AbortedByUser);
        };

        for key in keys_from_line(&line) {
            let (next, transition) = state.update(key);
            state = next;
            match transition {
                Transition::Continue => {}
                Transition::Committed => {
                    tracing::debug!(
                        max_fee = %state.candidate_max_fee,
                        status = %state.status(),
                        "Fee editor committed"
                    );
                    return Ok(state);
                }
                Transition::Aborted => return Err(SendError::AbortedByUser),
            }
        }
    }
}
