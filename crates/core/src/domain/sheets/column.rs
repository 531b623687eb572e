use std::fmt::Formatter;

/// 1-based spreadsheet column. `Column(1)` is `A`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Column(u32);

impl Column {
    pub fn first() -> Self {
        Column(1)
    }

    pub fn value(&self) -> u32 {
        self.0
    }

    /// Zero-based offset, as used by grid APIs and in-memory tables.
    pub fn index(&self) -> u32 {
        self.0.saturating_sub(1)
    }
}

impl std::ops::Add<u32> for Column {
    type Output = Column;

    fn add(self, rhs: u32) -> Self::Output {
        Column(self.0.saturating_add(rhs))
    }
}

impl std::fmt::Display for Column {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", number_to_letters(self.0))
    }
}

impl std::fmt::Debug for Column {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Column(u32: {}, letters: {})", self.0, self)
    }
}

fn number_to_letters(number: u32) -> String {
    let mut number = number;
    let mut result = String::new();
    while number > 0 {
        let remainder = (number - 1) % 26;
        result.push((remainder as u8 + b'A') as char);
        number = (number - remainder) / 26;
    }
    result.chars().rev().collect()
}
