use common::model::field::CanonicalField;
use common::model::row::ParsedCsv;

pub enum Msg {
    OpenFileDialog,
    FileSelected(web_sys::File),
    FileParsed {
        file: web_sys::File,
        name: String,
        size: u64,
        result: Result<ParsedCsv, String>,
    },
    SelectField {
        header: String,
        field: Option<CanonicalField>,
    },
    Submit,
    SubmitFinished(Result<usize, String>),
}
