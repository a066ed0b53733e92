mod codec_tests;
mod mocks;
