//! State and validation model of the create-array dialog.
//!
//! The frontend owns the widgets; this model owns everything else — the fill
//! mode, the raw text of the size and type inputs, and the validation that
//! runs synchronously on every edit and feeds the dialog's error region and
//! accept button. Typed getters are meaningful once [`CreateArrayState::is_valid`]
//! holds.

use strum::{Display, EnumIter, EnumString};

/// How the new array's extent is determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter)]
pub enum ArrayFillMode {
    /// A fixed number of bytes, taken from the size input.
    FillToSize,
    /// A fixed number of elements of the entered type.
    FillToSizeWithType,
    /// From the selection start to the end of the containing section.
    FillToEndOfSection,
    /// From the selection start to the next known data variable.
    FillToNextDataVariable,
}

/// Dialog state: inputs, derived context and validation results.
///
/// # Examples
///
/// ```rust
/// use binscope::ui::create_array::{ArrayFillMode, CreateArrayState};
///
/// let mut state = CreateArrayState::new(0x1000, 0x1040, ArrayFillMode::FillToSize);
/// assert!(!state.is_valid()); // size input still empty
///
/// state.set_size_text("0x40");
/// assert!(state.is_valid());
/// assert_eq!(state.size(), 0x40);
/// assert_eq!(state.byte_length(), Some(0x40));
/// ```
#[derive(Debug, Clone)]
pub struct CreateArrayState {
    mode: ArrayFillMode,
    size_text: String,
    type_text: String,
    start: u64,
    end: u64,
    section_end: Option<u64>,
    next_data_variable: Option<u64>,
    errors: Vec<String>,
}

impl CreateArrayState {
    /// A fresh dialog over the selection `[start, end)` in the given mode.
    #[must_use]
    pub fn new(start: u64, end: u64, initial_mode: ArrayFillMode) -> Self {
        let mut state = Self {
            mode: initial_mode,
            size_text: String::new(),
            type_text: String::new(),
            start,
            end,
            section_end: None,
            next_data_variable: None,
            errors: Vec::new(),
        };
        state.validate();
        state
    }

    /// Provide the end address of the section containing the selection.
    #[must_use]
    pub fn with_section_end(mut self, section_end: u64) -> Self {
        self.section_end = Some(section_end);
        self.validate();
        self
    }

    /// Provide the address of the next data variable after the selection.
    #[must_use]
    pub fn with_next_data_variable(mut self, address: u64) -> Self {
        self.next_data_variable = Some(address);
        self.validate();
        self
    }

    /// Selected fill mode.
    #[must_use]
    pub fn mode(&self) -> ArrayFillMode {
        self.mode
    }

    /// Switch the fill mode; validation runs immediately.
    pub fn set_mode(&mut self, mode: ArrayFillMode) {
        self.mode = mode;
        self.validate();
    }

    /// Edit the size input; validation runs immediately.
    pub fn set_size_text(&mut self, text: &str) {
        self.size_text = text.to_string();
        self.validate();
    }

    /// Edit the type input; validation runs immediately.
    pub fn set_type_text(&mut self, text: &str) {
        self.type_text = text.to_string();
        self.validate();
    }

    /// Start address of the selection.
    #[must_use]
    pub fn start(&self) -> u64 {
        self.start
    }

    /// Parsed size input, or `0` when it does not parse.
    #[must_use]
    pub fn size(&self) -> u64 {
        parse_address_or_size(&self.size_text).unwrap_or(0)
    }

    /// The entered element type, when the mode uses one and it is non-empty.
    pub fn element_type(&self) -> Option<&str> {
        if self.mode != ArrayFillMode::FillToSizeWithType {
            return None;
        }
        let trimmed = self.type_text.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }

    /// Number of bytes the array would cover, when the inputs allow
    /// computing it.
    #[must_use]
    pub fn byte_length(&self) -> Option<u64> {
        if !self.is_valid() {
            return None;
        }
        match self.mode {
            ArrayFillMode::FillToSize | ArrayFillMode::FillToSizeWithType => Some(self.size()),
            ArrayFillMode::FillToEndOfSection => {
                self.section_end.map(|section_end| section_end - self.start)
            }
            ArrayFillMode::FillToNextDataVariable => {
                self.next_data_variable.map(|address| address - self.start)
            }
        }
    }

    /// Whether the accept button is enabled.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Current validation failures, in display order.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// The text shown in the dialog's error region.
    #[must_use]
    pub fn error_text(&self) -> String {
        self.errors.join("\n")
    }

    fn validate(&mut self) {
        self.errors.clear();

        if self.end < self.start {
            self.errors
                .push("Selection end is before its start".to_string());
        }

        match self.mode {
            ArrayFillMode::FillToSize | ArrayFillMode::FillToSizeWithType => {
                match parse_address_or_size(&self.size_text) {
                    None if self.size_text.trim().is_empty() => {
                        self.errors.push("Size is required".to_string());
                    }
                    None => {
                        self.errors
                            .push(format!("Invalid size: {:?}", self.size_text));
                    }
                    Some(0) => {
                        self.errors.push("Size must be non-zero".to_string());
                    }
                    Some(_) => {}
                }
                if self.mode == ArrayFillMode::FillToSizeWithType
                    && self.type_text.trim().is_empty()
                {
                    self.errors.push("Element type is required".to_string());
                }
            }
            ArrayFillMode::FillToEndOfSection => match self.section_end {
                None => self
                    .errors
                    .push("Selection is not inside a section".to_string()),
                Some(section_end) if section_end <= self.start => self
                    .errors
                    .push("Containing section ends before the selection".to_string()),
                Some(_) => {}
            },
            ArrayFillMode::FillToNextDataVariable => match self.next_data_variable {
                None => self
                    .errors
                    .push("No data variable after the selection".to_string()),
                Some(address) if address <= self.start => self
                    .errors
                    .push("Next data variable is before the selection".to_string()),
                Some(_) => {}
            },
        }
    }
}

/// Parse a decimal or `0x`-prefixed hexadecimal value.
fn parse_address_or_size(text: &str) -> Option<u64> {
    let trimmed = text.trim();
    if let Some(hex) = trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X")) {
        u64::from_str_radix(hex, 16).ok()
    } else {
        trimmed.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_modes_validate_the_size_input() {
        let mut state = CreateArrayState::new(0x1000, 0x1040, ArrayFillMode::FillToSize);
        assert!(!state.is_valid());
        assert_eq!(state.errors(), ["Size is required"]);

        state.set_size_text("not a number");
        assert!(!state.is_valid());
        assert!(state.error_text().contains("Invalid size"));
        assert_eq!(state.size(), 0);

        state.set_size_text("0");
        assert_eq!(state.errors(), ["Size must be non-zero"]);

        state.set_size_text("64");
        assert!(state.is_valid());
        assert_eq!(state.size(), 64);
        assert_eq!(state.byte_length(), Some(64));
    }

    #[test]
    fn typed_mode_also_requires_a_type() {
        let mut state = CreateArrayState::new(0x1000, 0x1040, ArrayFillMode::FillToSizeWithType);
        state.set_size_text("16");
        assert!(!state.is_valid());
        assert_eq!(state.errors(), ["Element type is required"]);
        assert_eq!(state.element_type(), None);

        state.set_type_text("  uint32_t ");
        assert!(state.is_valid());
        assert_eq!(state.element_type(), Some("uint32_t"));
    }

    #[test]
    fn section_mode_needs_section_context() {
        let state = CreateArrayState::new(0x1000, 0x1040, ArrayFillMode::FillToEndOfSection);
        assert!(!state.is_valid());

        let state = CreateArrayState::new(0x1000, 0x1040, ArrayFillMode::FillToEndOfSection)
            .with_section_end(0x2000);
        assert!(state.is_valid());
        assert_eq!(state.byte_length(), Some(0x1000));

        let state = CreateArrayState::new(0x1000, 0x1040, ArrayFillMode::FillToEndOfSection)
            .with_section_end(0x800);
        assert!(!state.is_valid());
    }

    #[test]
    fn data_variable_mode_needs_a_following_variable() {
        let state =
            CreateArrayState::new(0x1000, 0x1040, ArrayFillMode::FillToNextDataVariable)
                .with_next_data_variable(0x1800);
        assert!(state.is_valid());
        assert_eq!(state.byte_length(), Some(0x800));

        let state =
            CreateArrayState::new(0x1000, 0x1040, ArrayFillMode::FillToNextDataVariable);
        assert!(!state.is_valid());
    }

    #[test]
    fn mode_switch_revalidates() {
        let mut state = CreateArrayState::new(0x1000, 0x1040, ArrayFillMode::FillToSize);
        state.set_size_text("32");
        assert!(state.is_valid());

        state.set_mode(ArrayFillMode::FillToEndOfSection);
        assert!(!state.is_valid());

        state.set_mode(ArrayFillMode::FillToSize);
        assert!(state.is_valid());
    }

    #[test]
    fn hex_sizes_parse() {
        let mut state = CreateArrayState::new(0, 0, ArrayFillMode::FillToSize);
        state.set_size_text("0x20");
        assert_eq!(state.size(), 32);
        assert!(state.is_valid());
    }
}
