//! List command - show the registered symbologies.

use barcodegen::symbology::EncoderRegistry;

use crate::error::CliError;

/// Run the list command.
pub fn run() -> Result<(), CliError> {
    let registry = EncoderRegistry::with_defaults();
    for line in listing(&registry) {
        println!("{line}");
    }
    Ok(())
}

/// One line per identifier: name, family and the family's extra options.
fn listing(registry: &EncoderRegistry) -> Vec<String> {
    let mut families = registry.families();
    families.sort_by(|a, b| a.0.cmp(&b.0));

    families
        .into_iter()
        .map(|(id, family)| {
            let keys = family.option_keys();
            if keys.is_empty() {
                format!("{id:<16} {family}")
            } else {
                format!("{id:<16} {family:<12} {}", keys.join(", "))
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing() {
        let lines = listing(&EncoderRegistry::with_defaults());
        assert_eq!(lines.len(), 9);
        assert!(lines[0].starts_with("code128 "));
        let imb = lines
            .iter()
            .find(|line| line.starts_with("intelligentmail"))
            .unwrap();
        assert!(imb.contains("tracking"));
        assert!(imb.contains("serialNumber"));
    }
}
