#![no_main]

use libfuzzer_sys::fuzz_target;
use maker_registry::ConfigurationBag;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    let bag = ConfigurationBag::from_properties_str(text);

    for (key, value) in bag.iter() {
        assert!(!key.is_empty());
        assert_eq!(bag.get(key), Some(value));

        // Re-escaping a decoded pair must parse back to the same pair
        let line = format!("{}={}\n", escape(key), escape(value));
        let again = ConfigurationBag::from_properties_str(&line);
        assert_eq!(again.get(key), Some(value));
        assert_eq!(again.len(), 1);

        // Parsing never panics, whatever the value
        let _ = bag.parse::<u64>(key);
        let _ = bag.parse::<bool>(key);
    }
});

fn escape(text: &str) -> String {
    let mut out = String::new();
    for c in text.chars() {
        match c {
            '\\' | '=' | ':' | ' ' | '#' | '!' => {
                out.push('\\');
                out.push(c);
            }
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\x0c' => out.push_str("\\f"),
            c => out.push(c),
        }
    }
    out
}
