// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use url::form_urlencoded;

use crate::{FieldKey, FieldSet};

// No leading `?`.
pub fn build_query(fields: &FieldSet) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for key in FieldKey::FILTERS {
        let value = fields.get(key);
        if value.is_empty() {
            continue;
        }
        serializer.append_pair(key.as_str(), value);
    }
    serializer.finish()
}
