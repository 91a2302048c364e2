const QUALIFIERS: [&str; 5] = [
    "(premium)",
    "(preview)",
    "integrations",
    "(independent publisher)",
    "(intranet)",
];

const ALIASES: [(&str, &str); 9] = [
    ("monday.com", "monday"),
    ("outlook.com", "outlook"),
    ("quick base", "quickbase"),
    ("ring central", "ringcentral"),
    ("rss by zapier", "rss"),
    ("ship station", "shipstation"),
    ("toggl plan", "toggl"),
    ("webex integration", "webex"),
    ("wordpress.com", "wordpress"),
];

/// Repeats the rewrite pass until nothing changes, since dropping one
/// qualifier can uncover another. Every rewrite shortens the string.
pub fn normalize_name(name: &str) -> String {
    let mut current = name.to_lowercase();

    loop {
        let next = normalize_once(&current);
        if next == current {
            return next;
        }
        current = next;
    }
}

fn normalize_once(name: &str) -> String {
    let mut result = name.to_string();

    for qualifier in QUALIFIERS {
        result = result.replace(qualifier, "");
    }
    for (alias, canonical) in ALIASES {
        result = result.replace(alias, canonical);
    }

    result.trim().to_string()
}
