/// Monotonic id source.
///
/// Ids are never reused for the lifetime of a generator, even after the
/// entity that held one is removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdGenerator {
    next: u64,
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    pub fn next_id(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }

    /// Ensures every future id is strictly greater than `id`.
    pub fn advance_past(&mut self, id: u64) {
        if id >= self.next {
            self.next = id + 1;
        }
    }

    pub fn peek(&self) -> u64 {
        self.next
    }
}

#[cfg(test)]
mod tests {
    use super::IdGenerator;

    #[test]
    fn ids_increase_monotonically() {
        let mut ids = IdGenerator::new();
        assert_eq!(ids.next_id(), 1);
        assert_eq!(ids.next_id(), 2);
        assert_eq!(ids.peek(), 3);
    }

    #[test]
    fn advance_past_skips_loaded_ids() {
        let mut ids = IdGenerator::new();
        ids.advance_past(41);
        assert_eq!(ids.next_id(), 42);
        ids.advance_past(10);
        assert_eq!(ids.next_id(), 43);
    }
}
