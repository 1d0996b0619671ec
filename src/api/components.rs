use std::fmt;
use std::str::FromStr;

/// Structured restriction for the `components` parameter.
///
/// Renders as `type:value` pairs joined with `|`, e.g.
/// `country:US|postal_code:94043`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentFilter {
    filters: Vec<(String, String)>,
}

impl ComponentFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, component_type: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.push((component_type.into(), value.into()));
        self
    }

    /// Append every pair of `other`, keeping order
    pub fn with_all(mut self, other: ComponentFilter) -> Self {
        self.filters.extend(other.filters);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

impl fmt::Display for ComponentFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (component_type, value)) in self.filters.iter().enumerate() {
            if i > 0 {
                f.write_str("|")?;
            }
            write!(f, "{component_type}:{value}")?;
        }
        Ok(())
    }
}

impl FromStr for ComponentFilter {
    type Err = String;

    /// Parse `type:value` pairs separated by `|`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut filter = Self::new();
        for pair in s.split('|').filter(|p| !p.trim().is_empty()) {
            let (component_type, value) = pair
                .split_once(':')
                .ok_or_else(|| format!("expected TYPE:VALUE, got '{pair}'"))?;
            if component_type.trim().is_empty() {
                return Err(format!("missing component type in '{pair}'"));
            }
            filter = filter.with(component_type.trim(), value.trim());
        }
        Ok(filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_pairs_in_order() {
        let filter = ComponentFilter::new()
            .with("country", "US")
            .with("postal_code", "94043");
        assert_eq!(filter.to_string(), "country:US|postal_code:94043");
    }

    #[test]
    fn test_empty_filter_renders_empty() {
        assert!(ComponentFilter::new().is_empty());
        assert_eq!(ComponentFilter::new().to_string(), "");
    }

    #[test]
    fn test_with_all_appends() {
        let filter = ComponentFilter::new()
            .with("country", "US")
            .with_all(ComponentFilter::new().with("locality", "Springfield"));
        assert_eq!(filter.to_string(), "country:US|locality:Springfield");
    }

    #[test]
    fn test_parse() {
        let filter: ComponentFilter = "country:GB | locality:London".parse().unwrap();
        assert_eq!(filter.to_string(), "country:GB|locality:London");
    }

    #[test]
    fn test_parse_rejects_malformed_pairs() {
        assert!("country".parse::<ComponentFilter>().is_err());
        assert!(":US".parse::<ComponentFilter>().is_err());
    }
}
