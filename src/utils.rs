/// Rounds `value` up to the next multiple of `multiple`.
pub fn multiple_of(mut value: u32, multiple: u32) -> u32 {
    let remainder = value % multiple;
    if remainder != 0 {
        value += multiple - remainder;
    }

    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_up_to_workgroups() {
        assert_eq!(multiple_of(0, 256), 0);
        assert_eq!(multiple_of(1, 256), 256);
        assert_eq!(multiple_of(256, 256), 256);
        assert_eq!(multiple_of(100_000, 256), 100_096);
    }
}
