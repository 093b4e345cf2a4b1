//! JSON:API create documents.

use serde_json::{Map, Value, json};

use doi_model::{Event, RelatedItem, SkipReason};

use crate::validate::ValidatedRow;

/// `types.resourceTypeGeneral` of every record this tool creates.
pub const RESOURCE_TYPE_GENERAL: &str = "Award";

/// Scheme URI sent with ROR publisher identifiers.
pub const ROR_SCHEME_URI: &str = "https://ror.org";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PayloadOptions {
    /// Registry prefix for rows without an identifier.
    pub prefix: Option<String>,
    pub event: Event,
    /// When set, the publisher is sent as a ROR-identified object.
    pub publisher_ror: Option<String>,
    /// Attach the default related-item block to every create.
    pub embed_related_item: bool,
}

/// Builds create documents from validated rows.
#[derive(Debug, Clone, Default)]
pub struct PayloadBuilder {
    options: PayloadOptions,
}

impl PayloadBuilder {
    pub fn new(options: PayloadOptions) -> Self {
        Self { options }
    }

    /// Builds `{"data": {"type": "dois", "attributes": {...}}}`.
    ///
    /// `identifier` is the row's own DOI, if any. Without one, a configured
    /// prefix is required so the registry can mint a suffix.
    pub fn build(
        &self,
        validated: &ValidatedRow<'_>,
        identifier: Option<&str>,
        url: &str,
    ) -> Result<Value, SkipReason> {
        let row = validated.row;
        let mut attributes = Map::new();
        attributes.insert("event".into(), json!(self.options.event));
        attributes.insert("titles".into(), json!([{ "title": validated.title }]));
        attributes.insert("creators".into(), json!([creator(validated)]));
        attributes.insert("publisher".into(), self.publisher(validated.publisher));
        attributes.insert(
            "publicationYear".into(),
            json!(validated.publication_year),
        );
        attributes.insert(
            "types".into(),
            json!({ "resourceTypeGeneral": RESOURCE_TYPE_GENERAL }),
        );
        attributes.insert("url".into(), json!(url));

        if let Some(contributor) = contributor(
            row.contributor_name.as_deref(),
            row.contributor_orcid.as_deref(),
        ) {
            attributes.insert("contributors".into(), json!([contributor]));
        }
        if self.options.embed_related_item {
            attributes.insert("relatedItems".into(), json!([RelatedItem::default()]));
        }

        let prefix = self
            .options
            .prefix
            .as_deref()
            .map(str::trim)
            .filter(|prefix| !prefix.is_empty());
        match (identifier, prefix) {
            (Some(doi), _) => {
                attributes.insert("doi".into(), json!(doi));
            }
            (None, Some(prefix)) => {
                attributes.insert("prefix".into(), json!(prefix));
            }
            (None, None) => return Err(SkipReason::MissingPrefix),
        }

        Ok(json!({
            "data": {
                "type": "dois",
                "attributes": Value::Object(attributes),
            }
        }))
    }

    fn publisher(&self, name: &str) -> Value {
        match self.options.publisher_ror.as_deref() {
            Some(ror) => json!({
                "name": name,
                "schemeUri": ROR_SCHEME_URI,
                "publisherIdentifier": ror,
                "publisherIdentifierScheme": "ROR",
                "lang": "en",
            }),
            None => json!(name),
        }
    }
}

fn creator(validated: &ValidatedRow<'_>) -> Value {
    let mut creator = json!({
        "name": validated.creator,
        "nameType": "Organizational",
    });
    if let Some(ror) = validated.row.creator_ror.as_deref() {
        creator["affiliation"] = json!([{
            "affiliationIdentifier": ror,
            "affiliationIdentifierScheme": "ROR",
        }]);
    }
    creator
}

fn contributor(name: Option<&str>, orcid: Option<&str>) -> Option<Value> {
    if name.is_none() && orcid.is_none() {
        return None;
    }
    let mut contributor = json!({
        "nameType": "Personal",
        "contributorType": "Researcher",
    });
    if let Some(name) = name {
        contributor["name"] = json!(name);
    }
    if let Some(orcid) = orcid {
        contributor["nameIdentifiers"] = json!([{
            "nameIdentifier": orcid,
            "nameIdentifierScheme": "ORCID",
        }]);
    }
    Some(contributor)
}
