use std::collections::HashMap;

/// Value counts that remember the order in which each distinct value was
/// first seen.
#[derive(Debug, Clone, Default)]
pub struct FrequencyCounter {
    positions: HashMap<String, usize>,
    entries: Vec<(String, usize)>,
}

impl FrequencyCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, value: &str) {
        match self.positions.get(value) {
            Some(&position) => self.entries[position].1 += 1,
            None => {
                self.positions.insert(value.to_string(), self.entries.len());
                self.entries.push((value.to_string(), 1));
            }
        }
    }

    pub fn distinct(&self) -> usize {
        self.entries.len()
    }

    /// Most frequent value. The current winner is only replaced when another
    /// value strictly exceeds its count, so ties go to the first value seen.
    pub fn mode(&self) -> Option<&str> {
        self.entries
            .iter()
            .fold(None::<&(String, usize)>, |best, entry| match best {
                Some(current) if current.1 >= entry.1 => Some(current),
                _ => Some(entry),
            })
            .map(|(value, _)| value.as_str())
    }

    /// Entries sorted by count descending, ties in first-seen order.
    /// `top == 0` keeps every entry.
    pub fn ranked(&self, top: usize) -> Vec<(String, usize)> {
        let mut items = self.entries.clone();
        items.sort_by(|a, b| b.1.cmp(&a.1));
        if top > 0 && items.len() > top {
            items.truncate(top);
        }
        items
    }
}

impl<'a> FromIterator<&'a str> for FrequencyCounter {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut counter = FrequencyCounter::new();
        for value in iter {
            counter.record(value);
        }
        counter
    }
}
