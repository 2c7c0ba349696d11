pub const fn _assert_send<T: Send>() {}
pub const fn _assert_sync<T: Sync>() {}

/// A buffer with a cursor splitting it into a consumed/produced prefix and the rest.
#[derive(Debug)]
pub(crate) struct PartialBuffer<B> {
    buffer: B,
    index: usize,
}

impl<B: AsRef<[u8]>> PartialBuffer<B> {
    pub(crate) fn new(buffer: B) -> Self {
        Self { buffer, index: 0 }
    }

    pub(crate) fn written(&self) -> &[u8] {
        &self.buffer.as_ref()[..self.index]
    }

    pub(crate) fn unwritten(&self) -> &[u8] {
        &self.buffer.as_ref()[self.index..]
    }

    pub(crate) fn advance(&mut self, amount: usize) {
        self.index += amount;
    }
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> PartialBuffer<B> {
    pub(crate) fn unwritten_mut(&mut self) -> &mut [u8] {
        &mut self.buffer.as_mut()[self.index..]
    }

    pub(crate) fn copy_unwritten_from<C: AsRef<[u8]>>(
        &mut self,
        other: &mut PartialBuffer<C>,
    ) -> usize {
        let len = self.unwritten().len().min(other.unwritten().len());

        self.unwritten_mut()[..len].copy_from_slice(&other.unwritten()[..len]);

        self.advance(len);
        other.advance(len);
        len
    }
}

#[cfg(test)]
mod tests {
    use super::PartialBuffer;

    #[test]
    fn copy_stops_at_shorter_side() {
        let mut src = PartialBuffer::new(&b"hello"[..]);
        let mut dst = PartialBuffer::new([0u8; 2]);

        assert_eq!(dst.copy_unwritten_from(&mut src), 2);
        assert_eq!(dst.written(), b"he");
        assert_eq!(src.unwritten(), b"llo");
        assert!(dst.unwritten().is_empty());

        let mut dst = PartialBuffer::new([0u8; 2]);
        assert_eq!(dst.copy_unwritten_from(&mut src), 2);
        assert_eq!(dst.written(), b"ll");
        assert_eq!(src.unwritten(), b"o");
    }
}
