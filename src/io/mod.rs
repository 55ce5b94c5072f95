mod buf;
mod buf_ext;
mod buf_mut;
mod buf_mut_ext;
mod buffer;

pub(crate) use buf::Buf;
pub(crate) use buf_ext::BufExt;
pub(crate) use buf_mut::BufMut;
pub(crate) use buf_mut_ext::BufMutExt;
pub(crate) use buffer::{Buffer, DEFAULT_BUF_SIZE};
