use crate::types::{Record, Zone};
use hickory_proto::rr::{DNSClass, Name, RData, Record as WireRecord, RecordType};
use std::collections::BTreeMap;

struct RecordSet {
    rtype: RecordType,
    class: DNSClass,
    data: Vec<RData>,
}

struct Node {
    name: Name,
    sets: Vec<RecordSet>,
}

/// Labels from the root down, lowercased. Ordering these keys gives the
/// canonical DNS name order: the apex first and every parent before its
/// children.
fn sort_key(name: &Name) -> Vec<Vec<u8>> {
    name.iter()
        .rev()
        .map(|label| label.to_ascii_lowercase())
        .collect()
}

/// One TXT character-string in master file form: quoted, with quotes and
/// backslashes escaped and non-printable bytes as `\DDD`.
fn quoted(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() + 2);
    out.push('"');
    for &b in bytes {
        match b {
            b'"' | b'\\' => {
                out.push('\\');
                out.push(b as char);
            }
            0x20..=0x7e => out.push(b as char),
            _ => out.push_str(&format!("\\{:03}", b)),
        }
    }
    out.push('"');
    out
}

/// Presentation format of `data`. hickory prints TXT strings back to back
/// without quotes, so those are rendered here.
fn presentation(data: &RData) -> String {
    match data {
        RData::TXT(txt) => txt
            .iter()
            .map(|s| quoted(s))
            .collect::<Vec<_>>()
            .join(" "),
        other => other.to_string(),
    }
}

/// Builds the zone `nameserver` served for `domain` out of the transferred
/// records.
///
/// Records are grouped per owner name and the groups sorted by name. Inside a
/// group, record sets keep the order they first showed up in and repeated
/// records are dropped.
pub fn build_zone(domain: &str, nameserver: &str, records: Vec<WireRecord>) -> Zone {
    let mut nodes: BTreeMap<Vec<Vec<u8>>, Node> = BTreeMap::new();

    for record in records {
        let node = nodes.entry(sort_key(record.name())).or_insert_with(|| Node {
            name: record.name().clone(),
            sets: Vec::new(),
        });

        let rtype = record.record_type();
        let class = record.dns_class();
        let data = record.data().clone();

        match node
            .sets
            .iter_mut()
            .find(|set| set.rtype == rtype && set.class == class)
        {
            Some(set) => {
                if !set.data.contains(&data) {
                    set.data.push(data);
                }
            }
            None => node.sets.push(RecordSet {
                rtype,
                class,
                data: vec![data],
            }),
        }
    }

    let records = nodes
        .into_values()
        .flat_map(|node| {
            let name = node.name.to_string();
            node.sets.into_iter().flat_map(move |set| {
                let name = name.clone();
                let class = set.class.to_string();
                let rtype = set.rtype.to_string();
                set.data.into_iter().map(move |data| Record {
                    name: name.clone(),
                    class: class.clone(),
                    rtype: rtype.clone(),
                    data: presentation(&data),
                })
            })
        })
        .collect();

    Zone {
        domain: domain.to_string(),
        nameserver: nameserver.to_string(),
        records,
    }
}
