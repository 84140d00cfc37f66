use validator::Validate;

/// Validates every item of a batch payload, stopping at the first invalid one.
pub fn validate_all<T: Validate>(items: &[T]) -> Result<(), validator::ValidationErrors> {
    items.iter().try_for_each(|item| item.validate())
}
