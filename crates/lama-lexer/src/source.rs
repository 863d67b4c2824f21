//! Pull-based character input for the scanner.

/// A source the scanner pulls one byte at a time from.
///
/// `None` marks the end of input; it is distinct from every byte value.
/// Any byte iterator is a source, so `"text".bytes()` and
/// `reader.bytes().map_while(Result::ok)` both work.
pub trait CharSource {
    fn next_char(&mut self) -> Option<u8>;
}

impl<I> CharSource for I
where
    I: Iterator<Item = u8>,
{
    fn next_char(&mut self) -> Option<u8> {
        self.next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iterator_source_ends_with_none() {
        let mut source = "ab".bytes();
        assert_eq!(source.next_char(), Some(b'a'));
        assert_eq!(source.next_char(), Some(b'b'));
        assert_eq!(source.next_char(), None);
    }
}
