mod typst;

pub use self::typst::generate_pdf;
