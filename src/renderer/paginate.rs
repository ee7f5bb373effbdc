//! Splitting records into physical sheets

use crate::records::MailingLabelRecord;
use crate::template::LabelTemplate;

/// One physical sheet: a fixed number of slots, filled row-major
#[derive(Debug, Clone, PartialEq)]
pub struct LabelPage<'a> {
    /// Zero-based page number
    pub index: usize,
    /// `None` marks an empty trailing slot
    pub slots: Vec<Option<&'a MailingLabelRecord>>,
}

impl<'a> LabelPage<'a> {
    /// Records on this page, in slot order
    pub fn records(&self) -> impl Iterator<Item = &'a MailingLabelRecord> + '_ {
        self.slots.iter().flatten().copied()
    }

    pub fn filled(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn empty(&self) -> usize {
        self.slots.len() - self.filled()
    }
}

/// Number of sheets needed for `record_count` labels
pub fn page_count(record_count: usize, labels_per_page: usize) -> usize {
    if labels_per_page == 0 {
        return 0;
    }
    record_count.div_ceil(labels_per_page)
}

/// Split records into pages of `columns x rows` slots. No records means no pages.
pub fn paginate<'a>(
    records: &'a [MailingLabelRecord],
    template: &LabelTemplate,
) -> Vec<LabelPage<'a>> {
    let per_page = template.labels_per_page();
    if per_page == 0 {
        return Vec::new();
    }

    records
        .chunks(per_page)
        .enumerate()
        .map(|(index, chunk)| {
            let mut slots: Vec<Option<&MailingLabelRecord>> = chunk.iter().map(Some).collect();
            slots.resize(per_page, None);
            LabelPage { index, slots }
        })
        .collect()
}
