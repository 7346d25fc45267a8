pub mod ports;
pub mod service;
pub mod sftp;

pub use ports::{
    remote_path, RemoteFileWriter, SshTarget, VmWriteError, VmWriteRequest, VmWriterService,
};
pub use service::VmWriterServiceImpl;
pub use sftp::SftpFileWriter;
