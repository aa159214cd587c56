/// Allocates correlation ids for outgoing requests
///
/// Ids start at 1 and are never reused for the lifetime of the generator.
#[derive(Debug)]
pub struct SequenceGenerator {
    next: u64,
}

impl SequenceGenerator {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Allocate the next id
    pub fn next_id(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }

    /// The id the next call to [`next_id`](Self::next_id) will return
    pub fn peek(&self) -> u64 {
        self.next
    }
}

impl Default for SequenceGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_monotonic() {
        let mut ids = SequenceGenerator::new();
        assert_eq!(ids.peek(), 1);
        assert_eq!(ids.next_id(), 1);
        assert_eq!(ids.next_id(), 2);
        assert_eq!(ids.next_id(), 3);
        assert_eq!(ids.peek(), 4);
    }

    #[test]
    fn test_generators_are_independent() {
        let mut a = SequenceGenerator::new();
        let mut b = SequenceGenerator::new();
        a.next_id();
        a.next_id();
        assert_eq!(b.next_id(), 1);
    }
}
