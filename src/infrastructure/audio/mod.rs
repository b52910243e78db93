//! Audio - WAV 编解码与输入探测

mod wav;

pub use wav::{decode_file, decode_wav, encode_wav, DecodedAudio, SymphoniaProbe};
