use anyhow::{Context, Result};
use specsync::v1::{Actor, CollectionItem, CopyPolicy, detach, query};
use specsync_openapi::{BuildContext, SpecDocument};

pub fn run(input: &str, json: bool, pretty: bool) -> Result<()> {
    let raw = crate::read_input(input)?;
    let doc = SpecDocument::parse(&raw).with_context(|| format!("Failed to parse {}", input))?;
    let folders: Vec<CollectionItem> = doc
        .build(&BuildContext::new(Actor::new("inspect")))
        .into_values()
        .map(|mut folder| {
            // One copy pass per request, as the importer does.
            if let Some(children) = folder.children_mut() {
                for child in children.iter_mut() {
                    *child = detach(child, CopyPolicy::default());
                }
            }
            folder
        })
        .collect();

    if json {
        println!("{}", crate::to_json(&folders, pretty)?);
    } else {
        print!("{}", summarize(&doc, &folders));
    }
    Ok(())
}

fn summarize(doc: &SpecDocument, folders: &[CollectionItem]) -> String {
    let mut out = format!(
        "title:    {}\ndialect:  {}\nfolders:  {}\nrequests: {}\n",
        doc.title(),
        doc.dialect(),
        folders.len(),
        query::count_requests(folders)
    );
    for folder in folders {
        out.push_str(&format!("  {} ({})\n", folder.name, folder.children().len()));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summarize() {
        let doc = SpecDocument::parse(
            r#"{
                "swagger": "2.0",
                "info": { "title": "Shop" },
                "paths": {
                    "/items": { "get": {}, "post": {} },
                    "/carts/{id}": { "get": { "tags": ["Cart"] } }
                }
            }"#,
        )
        .unwrap();
        let folders: Vec<CollectionItem> = doc
            .build(&BuildContext::new(Actor::new("t")))
            .into_values()
            .collect();
        assert_eq!(
            summarize(&doc, &folders),
            "title:    Shop\n\
             dialect:  swagger-2.0\n\
             folders:  2\n\
             requests: 3\n\
             \x20 items (2)\n\
             \x20 Cart (1)\n"
        );
    }
}
