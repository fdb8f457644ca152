/// Number of bytes needed to pad `len` up to a 32-bit boundary.
pub(crate) fn get_padding_size(len: usize) -> usize {
    if len % 4 == 0 { 0 } else { 4 - (len % 4) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_padding_size() {
        let tests = [(0, 0), (1, 3), (2, 2), (3, 1), (4, 0), (100, 0), (500, 0)];

        for (n, p) in tests {
            assert_eq!(get_padding_size(n), p, "padding size for {n}");
        }
    }
}
