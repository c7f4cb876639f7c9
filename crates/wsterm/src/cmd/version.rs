use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("wsterm {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: wsterm");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!("target: {}", env!("WSTERM_BUILD_TARGET"));
    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    println!("git_hash: {}", option_env!("GIT_HASH").unwrap_or("unknown"));
    println!("protocol: tag byte (0=input, 1=stdout, 2=stderr) + payload");
    println!("transport: websocket (ws://)");

    Ok(SUCCESS)
}
