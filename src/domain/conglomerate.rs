use super::name::normalize_name;

/// Substring key to owning organization. Matching is first-match-wins in
/// this order, so specific products must sit above broader brands that
/// could also match. Trailing spaces on keys are significant.
pub const CONGLOMERATES: &[(&str, &str)] = &[
    ("Workbot", "Workato"),
    ("Gmail", "Google"),
    ("Google", "Google"),
    ("Microsoft", "Microsoft"),
    ("Azure", "Microsoft"),
    ("AWS", "Amazon"),
    ("Amazon", "Amazon"),
    ("Adobe", "Adobe"),
    ("Facebook", "Meta"),
    ("Instagram", "Meta"),
    ("Jira", "Atlassian"),
    ("Confluence Cloud", "Atlassian"),
    ("Youtube", "Google"),
    ("Zoho", "Zoho"),
    ("Zendesk", "Zendesk"),
    ("Zapier", "Zapier"),
    ("ADP ", "ADP"),
    ("Bitbucket", "Atlassian"),
    ("Dropbox", "Dropbox"),
    ("dynamics 365", "Microsoft"),
    ("Evernote", "Evernote"),
    ("Excel ", "Microsoft"),
    ("Workato", "Workato"),
    ("Basecamp", "Basecamp"),
    ("magento", "magento"),
    ("Freshsales", "Freshsales"),
    ("Github", "Github"),
    ("Hubspot", "Hubspot"),
    ("ia-connect", "ia-connect"),
    ("jobvite", "jobvite"),
    ("linkedin", "linkedin"),
    ("mailchimp", "mailchimp"),
    ("mailerlite", "mailerlite"),
    ("marketo", "marketo"),
    ("monday", "monday"),
    ("netsuite", "oracle"),
    ("office 365 ", "microsoft"),
    ("onedrive", "microsoft"),
    ("onenote", "onenote"),
    ("openai", "openai"),
    ("opentext", "opentext"),
    ("oracle", "oracle"),
    ("outlook", "microsoft"),
    ("plumsail", "plumsail"),
    ("Power Apps for Makers", "Microsoft"),
    ("power automate", "Microsoft"),
    ("power bi", "Microsoft"),
    ("power platform", "Microsoft"),
    ("priority matrix", "priority matrix"),
    ("projectwise", "projectwise"),
    ("propublica", "propublica"),
    ("quickbooks online", "intuit"),
    ("redshift", "Amazon"),
    ("resimpli", "resimpli"),
    ("reversinglabs", "reversinglabs"),
    ("ringcentral", "ringcentral"),
    ("riskiq", "riskiq"),
    ("salesforce", "salesforce"),
    ("sap", "sap"),
    ("seismic", "seismic"),
    ("sharepoint", "microsoft"),
    ("shipstation", "shipstation"),
    ("sigma", "sigma"),
    ("signl4", "signl4"),
    ("spoonacular", "spoonacular"),
    ("sql server", "microsoft"),
    ("square business", "square"),
    ("square payments", "square"),
    ("sugarcrm", "sugarcrm"),
    ("survalyzer", "survalyzer"),
    ("taleo", "taleo"),
    ("teamwork ", "teamwork"),
    ("telegram ", "telegram"),
    ("threads", "meta"),
    ("toggl", "toggl"),
    ("tyntec", "tyntec"),
    ("udemy", "udemy"),
    ("ukg pro", "ukg pro"),
    ("video indexer", "video indexer"),
    ("watson ", "ibm"),
    ("workday", "workday"),
    ("xero", "xero"),
    ("xpertdoc", "xpertdoc"),
];

pub fn resolve_parent(name: &str) -> String {
    let lowered = name.to_lowercase();

    CONGLOMERATES
        .iter()
        .find(|(key, _)| lowered.contains(&key.to_lowercase()))
        .map(|(_, parent)| parent.to_lowercase())
        .unwrap_or_else(|| normalize_name(name))
}

#[cfg(test)]
mod tests {
    use super::{resolve_parent, CONGLOMERATES};
    use crate::domain::name::normalize_name;

    #[test]
    fn dynamics_resolves_to_microsoft() {
        assert_eq!(resolve_parent("Microsoft Dynamics 365"), "microsoft");
        assert_eq!(resolve_parent("Dynamics 365 Business Central"), "microsoft");
    }

    #[test]
    fn first_key_in_table_order_wins() {
        // "Jira" is listed before "Zapier", "Zoho" before "Zapier".
        assert_eq!(resolve_parent("Jira by Zapier"), "atlassian");
        assert_eq!(resolve_parent("Zapier Zoho Bridge"), "zoho");
        // "Workbot" is listed before "Microsoft".
        assert_eq!(resolve_parent("Workbot for Microsoft Teams"), "workato");
    }

    #[test]
    fn substring_match_is_not_longest_match() {
        // "sap" hides inside "whatsapp" and no earlier key matches.
        assert_eq!(resolve_parent("WhatsApp Business"), "sap");
    }

    #[test]
    fn trailing_space_keys_need_a_following_word() {
        assert_eq!(resolve_parent("Excel Online"), "microsoft");
        assert_eq!(resolve_parent("Excelify"), "excelify");
    }

    #[test]
    fn falls_back_to_normalized_name() {
        for name in ["Trello", "Notion (Preview)", "Quick Base", "Airtable Integrations"] {
            assert_eq!(resolve_parent(name), normalize_name(name));
        }
    }

    #[test]
    fn resolution_is_deterministic() {
        for name in ["Google Sheets", "Slack", "Amazon S3", "Monday.com"] {
            assert_eq!(resolve_parent(name), resolve_parent(name));
        }
    }

    #[test]
    fn parents_are_lowercase() {
        for (key, _) in CONGLOMERATES {
            let parent = resolve_parent(&format!("{key}x"));
            assert_eq!(parent, parent.to_lowercase());
        }
    }
}
