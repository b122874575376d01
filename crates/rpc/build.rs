use cfg_aliases::cfg_aliases;

fn main() {
    cfg_aliases! {
        http_rpc_sender: { feature = "http-rpc-sender" },
    }
}
