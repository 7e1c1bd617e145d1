//! S3 XML serialization: converting model types to S3-compatible XML.

use std::io::{self, Write};

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesText, Event};

use metalstack_s3_model::format_s3_time;
use metalstack_s3_model::output::{GetObjectAclOutput, ListBucketsOutput, ListObjectsV2Output};
use metalstack_s3_model::types::{Bucket, CommonPrefix, Grant, Grantee, Object, Owner};

use crate::error::XmlError;

/// The S3 XML namespace.
pub const S3_NAMESPACE: &str = "http://s3.amazonaws.com/doc/2006-03-01/";

const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// Trait for serializing S3 types to XML.
///
/// Implementors write their content as child elements inside the current XML context.
/// The root element name and namespace are handled by the top-level [`to_xml`] function.
pub trait S3Serialize {
    /// Serialize this value as XML child elements into the given writer.
    ///
    /// # Errors
    ///
    /// Returns `io::Error` if writing to the underlying writer fails.
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()>;
}

/// Serialize a value as S3-compatible XML with declaration and namespace.
///
/// # Errors
///
/// Returns `XmlError` if serialization fails.
pub fn to_xml<T: S3Serialize>(root_element: &str, value: &T) -> Result<Vec<u8>, XmlError> {
    let mut buf = Vec::with_capacity(512);
    let mut writer = Writer::new(&mut buf);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    writer
        .create_element(root_element)
        .with_attribute(("xmlns", S3_NAMESPACE))
        .write_inner_content(|w| value.serialize_xml(w))?;

    Ok(buf)
}

/// Write a simple `<tag>text</tag>` element.
fn write_text_element<W: Write>(writer: &mut Writer<W>, tag: &str, text: &str) -> io::Result<()> {
    writer
        .create_element(tag)
        .write_text_content(BytesText::new(text))?;
    Ok(())
}

/// Write `<tag>text</tag>` only if the value is `Some`.
fn write_optional_text<W: Write>(
    writer: &mut Writer<W>,
    tag: &str,
    value: Option<&str>,
) -> io::Result<()> {
    if let Some(v) = value {
        write_text_element(writer, tag, v)?;
    }
    Ok(())
}

fn write_bool<W: Write>(writer: &mut Writer<W>, tag: &str, value: bool) -> io::Result<()> {
    write_text_element(writer, tag, if value { "true" } else { "false" })
}

impl S3Serialize for Owner {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        writer.create_element("Owner").write_inner_content(|w| {
            write_text_element(w, "ID", &self.id)?;
            write_optional_text(w, "DisplayName", self.display_name.as_deref())?;
            Ok(())
        })?;
        Ok(())
    }
}

impl S3Serialize for Bucket {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        writer.create_element("Bucket").write_inner_content(|w| {
            write_text_element(w, "CreationDate", &format_s3_time(&self.creation_date))?;
            write_text_element(w, "Name", &self.name)?;
            Ok(())
        })?;
        Ok(())
    }
}

impl S3Serialize for Object {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        writer.create_element("Contents").write_inner_content(|w| {
            write_text_element(w, "Key", &self.key)?;
            write_text_element(w, "LastModified", &format_s3_time(&self.last_modified))?;
            write_optional_text(w, "ETag", self.e_tag.as_deref())?;
            write_text_element(w, "Size", &self.size.to_string())?;
            write_text_element(w, "StorageClass", "STANDARD")?;
            Ok(())
        })?;
        Ok(())
    }
}

impl S3Serialize for CommonPrefix {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        writer
            .create_element("CommonPrefixes")
            .write_inner_content(|w| write_text_element(w, "Prefix", &self.prefix))?;
        Ok(())
    }
}

impl S3Serialize for Grantee {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        writer
            .create_element("Grantee")
            .with_attribute(("xmlns:xsi", XSI_NAMESPACE))
            .with_attribute(("xsi:type", self.r#type.as_str()))
            .write_inner_content(|w| {
                write_optional_text(w, "ID", self.id.as_deref())?;
                write_optional_text(w, "DisplayName", self.display_name.as_deref())?;
                write_optional_text(w, "URI", self.uri.as_deref())?;
                Ok(())
            })?;
        Ok(())
    }
}

impl S3Serialize for Grant {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        writer.create_element("Grant").write_inner_content(|w| {
            self.grantee.serialize_xml(w)?;
            write_text_element(w, "Permission", self.permission.as_str())?;
            Ok(())
        })?;
        Ok(())
    }
}

impl S3Serialize for ListBucketsOutput {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        if let Some(ref owner) = self.owner {
            owner.serialize_xml(writer)?;
        }
        writer.create_element("Buckets").write_inner_content(|w| {
            for bucket in &self.buckets {
                bucket.serialize_xml(w)?;
            }
            Ok(())
        })?;
        Ok(())
    }
}

impl S3Serialize for ListObjectsV2Output {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        write_text_element(writer, "Name", &self.name)?;
        write_text_element(writer, "Prefix", &self.prefix)?;
        write_optional_text(writer, "Delimiter", self.delimiter.as_deref())?;
        write_text_element(writer, "KeyCount", &self.key_count.to_string())?;
        write_bool(writer, "IsTruncated", self.is_truncated)?;
        for object in &self.contents {
            object.serialize_xml(writer)?;
        }
        for prefix in &self.common_prefixes {
            prefix.serialize_xml(writer)?;
        }
        Ok(())
    }
}

impl S3Serialize for GetObjectAclOutput {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        if let Some(ref owner) = self.owner {
            owner.serialize_xml(writer)?;
        }
        writer
            .create_element("AccessControlList")
            .write_inner_content(|w| {
                for grant in &self.grants {
                    grant.serialize_xml(w)?;
                }
                Ok(())
            })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use metalstack_s3_model::types::{GranteeType, Permission};

    use super::*;

    fn ts() -> chrono::DateTime<chrono::Utc> {
        chrono::Utc
            .with_ymd_and_hms(2024, 1, 2, 3, 4, 5)
            .single()
            .unwrap()
    }

    fn render<T: S3Serialize>(root: &str, value: &T) -> String {
        String::from_utf8(to_xml(root, value).unwrap()).unwrap()
    }

    #[test]
    fn test_should_serialize_list_all_my_buckets() {
        let output = ListBucketsOutput {
            owner: Some(Owner {
                id: "metal".to_owned(),
                display_name: None,
            }),
            buckets: vec![Bucket {
                name: "state".to_owned(),
                creation_date: ts(),
            }],
        };
        let xml = render("ListAllMyBucketsResult", &output);

        assert!(xml.contains(&format!(
            "<ListAllMyBucketsResult xmlns=\"{S3_NAMESPACE}\">"
        )));
        assert!(xml.contains("<Owner><ID>metal</ID></Owner>"));
        assert!(xml.contains(
            "<Buckets><Bucket><CreationDate>2024-01-02T03:04:05.000Z</CreationDate><Name>state</Name></Bucket></Buckets>"
        ));
    }

    #[test]
    fn test_should_serialize_empty_bucket_list() {
        let xml = render("ListAllMyBucketsResult", &ListBucketsOutput::default());
        assert!(xml.contains("<Buckets></Buckets>") || xml.contains("<Buckets/>"));
    }

    #[test]
    fn test_should_serialize_list_bucket_result() {
        let output = ListObjectsV2Output {
            name: "state".to_owned(),
            prefix: "cluster/".to_owned(),
            delimiter: Some("/".to_owned()),
            key_count: 1,
            is_truncated: false,
            contents: vec![Object {
                key: "cluster/config".to_owned(),
                last_modified: ts(),
                size: 12,
                e_tag: Some("\"abc\"".to_owned()),
            }],
            common_prefixes: vec![CommonPrefix {
                prefix: "cluster/instancegroup/".to_owned(),
            }],
        };
        let xml = render("ListBucketResult", &output);

        assert!(xml.contains("<Name>state</Name><Prefix>cluster/</Prefix><Delimiter>/</Delimiter>"));
        assert!(xml.contains("<KeyCount>1</KeyCount><IsTruncated>false</IsTruncated>"));
        assert!(xml.contains("<Key>cluster/config</Key>"));
        assert!(xml.contains("<Size>12</Size>"));
        assert!(xml.contains(
            "<CommonPrefixes><Prefix>cluster/instancegroup/</Prefix></CommonPrefixes>"
        ));
    }

    #[test]
    fn test_should_omit_delimiter_when_absent() {
        let output = ListObjectsV2Output {
            name: "b".to_owned(),
            ..ListObjectsV2Output::default()
        };
        let xml = render("ListBucketResult", &output);
        assert!(!xml.contains("<Delimiter>"));
        assert!(xml.contains("<Prefix></Prefix>") || xml.contains("<Prefix/>"));
    }

    #[test]
    fn test_should_serialize_access_control_policy() {
        let output = GetObjectAclOutput {
            owner: Some(Owner {
                id: "owner-1".to_owned(),
                display_name: None,
            }),
            grants: vec![Grant {
                grantee: Grantee {
                    id: Some("owner-1".to_owned()),
                    r#type: GranteeType::CanonicalUser,
                    ..Grantee::default()
                },
                permission: Permission::FullControl,
            }],
        };
        let xml = render("AccessControlPolicy", &output);

        assert!(xml.contains("xsi:type=\"CanonicalUser\""));
        assert!(xml.contains("<ID>owner-1</ID></Grantee><Permission>FULL_CONTROL</Permission>"));
        assert!(xml.contains("<AccessControlList><Grant>"));
    }
}
