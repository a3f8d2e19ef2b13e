//! Path templates for the pages a waterfall links to.

pub fn waterfall_page(project: &str, skip: u64) -> String {
    format!("/waterfall/{project}?skip={skip}")
}

pub fn version(id: &str) -> String {
    format!("/version/{id}")
}

pub fn build_variant(project: &str, variant_id: &str) -> String {
    format!("/build_variant/{project}/{variant_id}")
}

pub fn build(id: &str) -> String {
    format!("/build/{id}")
}

pub fn task(id: &str) -> String {
    format!("/task/{id}")
}
