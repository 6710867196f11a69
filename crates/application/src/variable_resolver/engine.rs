//! Resolves `{{key}}` references against a dataset.

use covenant_domain::Dataset;

use super::parser::parse_variables;

/// Substitutes dataset values into strings.
///
/// Unlike free-form templating, every reference must resolve: a test that
/// silently sends `{{validUserId}}` to the server proves nothing.
pub struct VariableResolver<'a> {
    dataset: &'a Dataset,
}

impl<'a> VariableResolver<'a> {
    /// Creates a resolver over `dataset`.
    #[must_use]
    pub const fn new(dataset: &'a Dataset) -> Self {
        Self { dataset }
    }

    /// Resolves all references in `input`.
    ///
    /// # Errors
    ///
    /// Returns the first key that has no dataset value.
    pub fn resolve(&self, input: &str) -> Result<String, String> {
        let references = parse_variables(input);
        if references.is_empty() {
            return Ok(input.to_string());
        }

        let mut result = String::with_capacity(input.len());
        let mut last_end = 0;
        for reference in &references {
            result.push_str(&input[last_end..reference.span.start]);
            let value = self
                .dataset
                .get(&reference.name)
                .ok_or_else(|| reference.name.clone())?;
            result.push_str(value);
            last_end = reference.span.end;
        }
        result.push_str(&input[last_end..]);

        Ok(result)
    }
}
